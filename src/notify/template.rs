/// Body of the "charging complete" email.
///
/// `{image_data}` is the only placeholder; literal braces are written `{{`
/// and `}}`.
pub const EMAIL_TEMPLATE: &str = include_str!("../../templates/email.html");

const PLACEHOLDER: &str = "{image_data}";

/// Fill the template's `{image_data}` placeholder and unescape doubled braces.
pub fn render(template: &str, image_data: &str) -> String {
    let mut out = String::with_capacity(template.len() + image_data.len());
    let mut rest = template;

    while let Some(idx) = rest.find(['{', '}']) {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        if rest.starts_with("{{") {
            out.push('{');
            rest = &rest[2..];
        } else if rest.starts_with("}}") {
            out.push('}');
            rest = &rest[2..];
        } else if rest.starts_with(PLACEHOLDER) {
            out.push_str(image_data);
            rest = &rest[PLACEHOLDER.len()..];
        } else {
            // Unknown field or lone brace: keep verbatim.
            out.push_str(&rest[..1]);
            rest = &rest[1..];
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_and_escapes() {
        let rendered = render("a {{ b }} <img>{image_data}</img>", "xyz");
        assert_eq!(rendered, "a { b } <img>xyz</img>");
    }

    #[test]
    fn test_bundled_template_renders_without_placeholders() {
        let rendered = render(EMAIL_TEMPLATE, "");
        assert!(!rendered.contains("{image_data}"));
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("body { font-family"));
        assert!(rendered.contains("fully charged"));
    }

    #[test]
    fn test_lone_braces_are_kept() {
        assert_eq!(render("x { y } {other}", ""), "x { y } {other}");
    }
}
