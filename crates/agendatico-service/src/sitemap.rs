//! Sitemap generation: static pages plus every live event page.

use chrono::{DateTime, Days, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};

use agendatico_db::db::connection::DbConnection;
use agendatico_db::db::query::events as events_query;

use crate::error::{ServiceError, ServiceResult};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `<url>` entry.
#[derive(Debug, Clone)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// ## Summary
/// Collects the sitemap entries: the landing page, the legal pages, and
/// every live event that started no earlier than yesterday.
///
/// ## Errors
/// Returns a database error if the event query fails.
pub async fn collect_urls(
    conn: &mut DbConnection<'_>,
    base_url: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Vec<SitemapUrl>> {
    let base = base_url.trim_end_matches('/');

    let mut urls = vec![
        SitemapUrl {
            loc: format!("{base}/"),
            lastmod: None,
            changefreq: "daily",
            priority: "1.0",
        },
        SitemapUrl {
            loc: format!("{base}/privacy"),
            lastmod: None,
            changefreq: "monthly",
            priority: "0.3",
        },
        SitemapUrl {
            loc: format!("{base}/terms"),
            lastmod: None,
            changefreq: "monthly",
            priority: "0.3",
        },
    ];

    let since = now - Days::new(1);
    for event in events_query::starting_since(conn, since).await? {
        urls.push(SitemapUrl {
            loc: format!("{base}/events/{}", event.slug),
            lastmod: Some(event.updated_at),
            changefreq: "weekly",
            priority: "0.8",
        });
    }

    Ok(urls)
}

/// ## Summary
/// Renders the entries as a sitemap XML document.
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn render(urls: &[SitemapUrl]) -> ServiceResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(XmlEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(XmlEvent::Start(urlset))?;

    for url in urls {
        writer.write_event(XmlEvent::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &url.loc)?;
        if let Some(lastmod) = url.lastmod {
            write_text_element(
                &mut writer,
                "lastmod",
                &lastmod.to_rfc3339_opts(SecondsFormat::Secs, true),
            )?;
        }
        write_text_element(&mut writer, "changefreq", url.changefreq)?;
        write_text_element(&mut writer, "priority", url.priority)?;
        writer.write_event(XmlEvent::End(BytesEnd::new("url")))?;
    }

    writer.write_event(XmlEvent::End(BytesEnd::new("urlset")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|err| ServiceError::ParseError(format!("sitemap is not valid UTF-8: {err}")))
}

/// ## Summary
/// Collects, renders, and writes the sitemap file; returns the URL count.
///
/// ## Errors
/// Returns database, rendering, or filesystem errors.
#[tracing::instrument(skip(conn))]
pub async fn write_sitemap(
    conn: &mut DbConnection<'_>,
    base_url: &str,
    now: DateTime<Utc>,
    output_path: &str,
) -> ServiceResult<usize> {
    let urls = collect_urls(conn, base_url, now).await?;
    let xml = render(&urls)?;

    if let Some(parent) = std::path::Path::new(output_path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output_path, xml).await?;

    tracing::info!(url_count = urls.len(), output_path, "Sitemap written");

    Ok(urls.len())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> ServiceResult<()> {
    writer.write_event(XmlEvent::Start(BytesStart::new(name)))?;
    writer.write_event(XmlEvent::Text(BytesText::new(text)))?;
    writer.write_event(XmlEvent::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_static_entries() {
        let urls = vec![SitemapUrl {
            loc: "https://agendatico.example/".to_string(),
            lastmod: None,
            changefreq: "daily",
            priority: "1.0",
        }];
        let xml = render(&urls).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(xml.contains("<loc>https://agendatico.example/</loc>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(!xml.contains("<lastmod>"));
    }

    #[test]
    fn renders_lastmod_as_utc_rfc3339() {
        let urls = vec![SitemapUrl {
            loc: "https://agendatico.example/events/feria".to_string(),
            lastmod: Some(Utc.with_ymd_and_hms(2025, 6, 18, 12, 30, 0).unwrap()),
            changefreq: "weekly",
            priority: "0.8",
        }];
        let xml = render(&urls).unwrap();
        assert!(xml.contains("<lastmod>2025-06-18T12:30:00Z</lastmod>"));
    }

    #[test]
    fn escapes_xml_special_characters_in_locs() {
        let urls = vec![SitemapUrl {
            loc: "https://agendatico.example/?a=1&b=2".to_string(),
            lastmod: None,
            changefreq: "daily",
            priority: "1.0",
        }];
        let xml = render(&urls).unwrap();
        assert!(xml.contains("a=1&amp;b=2"));
    }
}
