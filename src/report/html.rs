use html_escape::{encode_double_quoted_attribute, encode_text};

use super::ReportContext;

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem;line-height:1.5}\
li{margin-bottom:.6rem}.meta{color:#666;font-size:.9em}";

/// Renders a standalone HTML page listing the articles in order.
///
/// Feed-provided strings are escaped for their context: titles as text,
/// links as double-quoted attribute values.
pub fn render_html(ctx: &ReportContext<'_>) -> String {
    let days = match ctx.days_back {
        1 => "1 day".to_string(),
        n => format!("{} days", n),
    };
    let generated = ctx.generated_at.format("%Y-%m-%d at %H:%M:%S");

    let mut out = String::with_capacity(1024 + ctx.articles.len() * 256);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>Articles from the last {}</title>\n", days));
    out.push_str(&format!("<style>{}</style>\n", STYLE));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<h1>Articles from the last {}</h1>\n", days));
    out.push_str(&format!("<p class=\"meta\">Generated {} UTC</p>\n", generated));

    if ctx.articles.is_empty() {
        out.push_str("<p>No articles in this period.</p>\n");
    } else {
        out.push_str("<ul>\n");
        for article in ctx.articles {
            out.push_str(&format!(
                "<li><a href=\"{}\">{}</a><br><span class=\"meta\">{} &middot; {}</span></li>\n",
                encode_double_quoted_attribute(&article.link),
                encode_text(&article.title),
                encode_text(&article.feed_title),
                article.published.format("%Y-%m-%d %H:%M"),
            ));
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}
