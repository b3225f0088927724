//! Canonical N-Quads text

use crate::rdf::{is_blank, Object, Triple, XSD_STRING};

/// One line per triple, sorted, joined by `\n` without a trailing newline
pub fn rdf_to_nquads(triples: &[Triple]) -> String {
    let mut lines: Vec<String> = triples.iter().map(quad_line).collect();
    lines.sort();
    lines.join("\n")
}

fn quad_line(triple: &Triple) -> String {
    let mut line = format!(
        "{} {} {}",
        format_id(&triple.subject),
        format_id(&triple.predicate),
        format_object(&triple.object)
    );
    if let Some(graph) = triple.graph.as_deref().filter(|g| !g.is_empty()) {
        line.push(' ');
        line.push_str(&format_id(graph));
    }
    line.push('.');
    line
}

fn format_id(id: &str) -> String {
    if is_blank(id) {
        id.to_string()
    } else {
        format!("<{}>", id)
    }
}

fn format_object(object: &Object) -> String {
    match object {
        Object::NamedNode { id } => format_id(id),
        Object::Literal(literal) => {
            let value = literal
                .value
                .to_string()
                .replace('"', "\\\"")
                .replace('\n', "\\n");
            match literal.datatype.as_deref() {
                Some(datatype) if datatype != XSD_STRING => {
                    format!("\"{}\"^^<{}>", value, datatype)
                }
                _ => format!("\"{}\"", value),
            }
        }
    }
}
