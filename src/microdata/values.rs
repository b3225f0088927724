//! Property value extraction for non-item `itemprop` elements
//!
//! Reference: https://html.spec.whatwg.org/multipage/microdata.html#values

use regex::Regex;
use scraper::node::Element;
use std::sync::LazyLock;

use super::urls::{is_absolute_url, try_resolve};
use crate::rdf::{
    Literal, Object, XSD_DATE, XSD_DATE_TIME, XSD_DOUBLE, XSD_DURATION, XSD_G_YEAR,
    XSD_G_YEAR_MONTH, XSD_INTEGER, XSD_TIME,
};

/// Where an element's property value comes from, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// `content` attribute, on any element
    MetaLike,
    /// `src` URL of embedded media
    SrcAttr,
    /// `href` URL of links
    HrefAttr,
    /// `data` URL of `<object>`
    DataAttr,
    /// numeric `value` of `<data>` and `<meter>`
    ValueAttr,
    /// `datetime` of `<time>`
    TimeAttr,
    /// text content
    Generic,
}

impl ValueSource {
    pub fn classify(element: &Element) -> Self {
        if element.attr("content").is_some() {
            return ValueSource::MetaLike;
        }
        match element.name() {
            "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => {
                ValueSource::SrcAttr
            }
            "a" | "area" | "link" => ValueSource::HrefAttr,
            "object" => ValueSource::DataAttr,
            "data" | "meter" => ValueSource::ValueAttr,
            "time" => ValueSource::TimeAttr,
            _ => ValueSource::Generic,
        }
    }
}

/// Resolve a URL attribute to a named node, or an empty literal if it cannot be resolved
pub fn url_value(value: Option<&str>, base: &str) -> Object {
    let Some(value) = value else {
        return Literal::plain("").into();
    };
    if is_absolute_url(value) {
        return Object::named(value);
    }
    match try_resolve(value, base) {
        resolved if resolved.is_empty() => Literal::plain("").into(),
        resolved => Object::named(resolved),
    }
}

/// Numeric literal typed `xsd:integer` or `xsd:double`; anything else stays a plain string
pub fn number_value(value: Option<&str>) -> Literal {
    let raw = value.unwrap_or_default();
    match parse_number(raw) {
        Some(number) if number.fract() == 0.0 => Literal::typed(number, XSD_INTEGER),
        Some(number) => Literal::typed(number, XSD_DOUBLE),
        None => Literal::plain(raw),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    // f64 parsing also accepts "inf" and "NaN", which are not numbers here
    if trimmed.is_empty() || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

static DATE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^\d{4}-\d{2}-\d{2}$", XSD_DATE),
        (
            r"^\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:[AZ]|[+-]\d{2}(?::\d{2})?)?$",
            XSD_TIME,
        ),
        (
            r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:[AZ]|[+-]\d{2}(?::\d{2})?)?$",
            XSD_DATE_TIME,
        ),
        (r"^\d{4}-\d{2}$", XSD_G_YEAR_MONTH),
        (r"^\d+$", XSD_G_YEAR),
        (
            r"^-?P(?:(?:\d+Y)?(?:\d+M)?(?:\d+D)?)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?$",
            XSD_DURATION,
        ),
    ]
    .into_iter()
    .map(|(pattern, datatype)| (Regex::new(pattern).expect("valid regex"), datatype))
    .collect()
});

/// Date/time literal typed by the first lexical form it matches
pub fn date_value(value: Option<&str>) -> Literal {
    let raw = value.unwrap_or_default();
    DATE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(raw))
        .map(|(_, datatype)| Literal::typed(raw, datatype))
        .unwrap_or_else(|| Literal::plain(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::LiteralValue;
    use scraper::{Html, Selector};

    fn classify_first(html: &str, selector: &str) -> ValueSource {
        let document = Html::parse_document(html);
        let selector = Selector::parse(selector).unwrap();
        let element = document.select(&selector).next().unwrap();
        ValueSource::classify(element.value())
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(
            classify_first(r#"<a itemprop="p" href="x" content="y"></a>"#, "a"),
            ValueSource::MetaLike
        );
        assert_eq!(classify_first(r#"<img itemprop="p" src="x">"#, "img"), ValueSource::SrcAttr);
        assert_eq!(classify_first(r#"<link itemprop="p" href="x">"#, "link"), ValueSource::HrefAttr);
        assert_eq!(classify_first(r#"<object itemprop="p" data="x"></object>"#, "object"), ValueSource::DataAttr);
        assert_eq!(classify_first(r#"<meter itemprop="p" value="1"></meter>"#, "meter"), ValueSource::ValueAttr);
        assert_eq!(classify_first(r#"<time itemprop="p"></time>"#, "time"), ValueSource::TimeAttr);
        assert_eq!(classify_first(r#"<span itemprop="p">x</span>"#, "span"), ValueSource::Generic);
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(Some("42")), Literal::typed(42.0, XSD_INTEGER));
        assert_eq!(number_value(Some("4.5")), Literal::typed(4.5, XSD_DOUBLE));
        assert_eq!(number_value(Some(" 1e3 ")), Literal::typed(1000.0, XSD_INTEGER));
        assert_eq!(number_value(Some("abc")), Literal::plain("abc"));
        assert_eq!(number_value(Some("  meter-value ")), Literal::plain("  meter-value "));
        assert_eq!(number_value(Some("inf")), Literal::plain("inf"));
        assert_eq!(number_value(None), Literal::plain(""));
    }

    #[test]
    fn test_date_value() {
        let datatype = |raw: &str| date_value(Some(raw)).datatype;
        assert_eq!(datatype("2014-01-01").as_deref(), Some(XSD_DATE));
        assert_eq!(datatype("12:30").as_deref(), Some(XSD_TIME));
        assert_eq!(datatype("12:30:15.5+02:00").as_deref(), Some(XSD_TIME));
        assert_eq!(datatype("2014-01-01T12:30:00Z").as_deref(), Some(XSD_DATE_TIME));
        assert_eq!(datatype("2014-01").as_deref(), Some(XSD_G_YEAR_MONTH));
        assert_eq!(datatype("2014").as_deref(), Some(XSD_G_YEAR));
        assert_eq!(datatype("P1Y2M3DT4H5M6.5S").as_deref(), Some(XSD_DURATION));
        assert_eq!(datatype("next tuesday"), None);
        assert_eq!(
            date_value(Some("next tuesday")).value,
            LiteralValue::Text("next tuesday".into())
        );
        assert_eq!(date_value(None), Literal::plain(""));
    }

    #[test]
    fn test_url_value() {
        assert_eq!(
            url_value(Some("./img"), "http://www.example.com"),
            Object::named("http://www.example.com/img")
        );
        assert_eq!(
            url_value(Some("http://www.absolute.com/img"), "invalid url"),
            Object::named("http://www.absolute.com/img")
        );
        assert_eq!(url_value(Some("./img"), "invalid url"), Object::from(Literal::plain("")));
        assert_eq!(url_value(None, "http://www.example.com"), Object::from(Literal::plain("")));
    }
}
