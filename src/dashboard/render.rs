use maud::{DOCTYPE, Markup, PreEscaped, Render, html};

use super::{Card, CardBody, DashboardData};

const STYLE: &str = r#"
body{font-family:Inter,Segoe UI,Roboto,Helvetica,Arial,sans-serif;margin:20px;background:#f7f8fb;color:#111}
h1{margin-bottom:0}
h2{margin-top:28px;border-bottom:1px solid #e3e5ea;padding-bottom:4px}
.card{display:flex;gap:12px;background:#fff;padding:12px;border-radius:8px;box-shadow:0 2px 6px rgba(0,0,0,0.06);margin:10px 0}
.card-left{width:120px;flex:0 0 120px}
.thumb{max-width:120px;border-radius:6px;display:block}
.card-body{flex:1;min-width:0}
.card-body h3{margin:0 0 6px 0}
.subtitle{color:#555;font-size:0.95rem;margin-bottom:6px}
.tags{color:#0b74de;font-size:0.9rem}
pre{white-space:pre-wrap;background:#fafafa;padding:8px;border-radius:6px;overflow:auto;max-height:220px}
.meta{margin-top:8px;font-size:0.9rem;color:#666}
.card-link{float:right;background:#0b74de;color:#fff;padding:6px 8px;border-radius:6px;text-decoration:none}
.images img.thumb{max-width:160px;margin-right:8px;margin-bottom:8px;display:inline-block}
.empty{color:#888;font-style:italic}
@media (max-width:700px){.card{flex-direction:column}}
"#;

impl Render for Card {
    fn render(&self) -> Markup {
        html! {
            div.card {
                @if let Some(thumb) = &self.thumb {
                    div.card-left { img.thumb src=(thumb) alt=(self.title); }
                }
                div.card-body {
                    h3 { (self.title) }
                    @if !self.subtitle.is_empty() {
                        div.subtitle { (self.subtitle) }
                    }
                    div.content {
                        @match &self.body {
                            CardBody::Text(text) => { p { (text) } }
                            CardBody::Pre(text) => { pre { (text) } }
                        }
                    }
                    @if !self.tags.is_empty() {
                        div.tags { (self.tags.join(" ")) }
                    }
                    @if let Some(link) = &self.link {
                        div.meta { a.card-link href=(link) target="_blank" { "Open" } }
                    }
                }
            }
        }
    }
}

fn section(title: &str, cards: &[Card], empty: &str) -> Markup {
    html! {
        h2 { (title) }
        @if cards.is_empty() {
            p.empty { (empty) }
        } @else {
            @for card in cards { (card) }
        }
    }
}

/// Complete dashboard document
pub fn render_dashboard(data: &DashboardData) -> String {
    let title = format!("{} Content Engine Dashboard", data.brand);

    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width,initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { (title) }
                p.meta { "Generated: " (data.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()) " (UTC)" }

                (section("Web Copy", &data.web_copy, "No web copy generated yet."))
                (section("Blogs", &data.blogs, "No blog articles generated yet."))
                (section("Social Posts", &data.social, "No social posts generated yet."))
                (section("Ads", &data.ads, "No ad snippets generated yet."))
                (section("Quality Checks", &data.qc, "No quality reports yet."))
                (section("Raw Scraper Outputs", &data.raw, "No scraper outputs yet."))

                h2 { "Images" }
                @if data.images.is_empty() {
                    p.empty { "No images found in images/." }
                } @else {
                    div.images {
                        @for image in &data.images {
                            a href=(image) target="_blank" { img.thumb src=(image) alt=(image); }
                        }
                    }
                }

                (section("SEO Artifacts", &data.jsonld, "No JSON-LD files yet."))
                @if let Some(sitemap) = &data.sitemap {
                    p { "Sitemap: " a href=(sitemap) target="_blank" { (sitemap) } }
                }

                hr;
                p.meta { "Dashboard generated by " (data.brand) " content engine." }
            }
        }
    };

    markup.into_string()
}
