use crate::config::GlobalConfig;
use crate::content::escape_attribute;
use crate::stylesheet::StyleSheet;

pub const VIEW_TRANSITION_RULE: &str = "@view-transition { navigation: auto; }";

/// Wrap an emitted body and its stylesheet into a full HTML document.
///
/// `wrapped` means the body already is a single `<body>` element.
pub fn assemble(config: &GlobalConfig, mut styles: StyleSheet, body: &str, wrapped: bool) -> String {
    if config.transition {
        styles.push(VIEW_TRANSITION_RULE);
    }

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!(
        "<html lang=\"{}\">\n",
        escape_attribute(&config.lang)
    ));
    html.push_str("<head>\n");
    html.push_str("<meta charset=\"UTF-8\" />\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n",
    );
    if !config.icon.is_empty() {
        html.push_str(&format!(
            "<link rel=\"icon\" href=\"{}\" />\n",
            escape_attribute(&config.icon)
        ));
    }
    html.push_str(&format!("<title>{}</title>\n", escape_attribute(&config.title)));
    html.push_str(&format!(
        "<meta name=\"description\" content=\"{}\" />\n",
        escape_attribute(&config.description)
    ));
    if !config.generator.is_empty() {
        html.push_str(&format!(
            "<meta name=\"generator\" content=\"{}\" />\n",
            escape_attribute(&config.generator)
        ));
    }
    if !styles.is_empty() {
        html.push_str("<style>\n");
        html.push_str(&styles.to_css());
        html.push_str("\n</style>\n");
    }
    html.push_str("</head>\n");

    if wrapped {
        html.push_str(body.trim_end());
    } else if body.trim().is_empty() {
        html.push_str("<body></body>");
    } else {
        html.push_str("<body>\n");
        html.push_str(body);
        if !body.ends_with('\n') {
            html.push('\n');
        }
        html.push_str("</body>");
    }

    html.push_str("\n</html>");
    html
}
