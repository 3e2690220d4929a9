//! XML sitemap of the public marketing pages.

use actix_web::{HttpResponse, web};

use crate::state::AppState;

const PAGES: &[&str] = &["/", "/about", "/blog", "/contact", "/work", "/login", "/signup"];

/// Escape text for an XML element body.
fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render(site_url: &str, last_modified: &str) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for page in PAGES {
        let priority = if *page == "/" { "1.0" } else { "0.7" };
        let loc = xml_escape(&format!("{site_url}{page}"));
        xml.push_str(&format!(
            "  <url>\n    <loc>{loc}</loc>\n    <lastmod>{last_modified}</lastmod>\n    \
             <changefreq>weekly</changefreq>\n    <priority>{priority}</priority>\n  </url>\n"
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// GET /sitemap.xml
pub async fn sitemap(state: web::Data<AppState>) -> HttpResponse {
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    HttpResponse::Ok()
        .content_type("application/xml")
        .body(render(&state.site_url, &today))
}
