//! Placeholder cover art
//!
//! Renders a vinyl-record SVG: radial gradient from the genre theme, groove
//! rings, a center label, and truncated title/artist text.

use crate::models::CoverTheme;

const TITLE_MAX: usize = 20;
const ARTIST_MAX: usize = 25;

/// Render the SVG cover for a track
pub fn render_cover(title: &str, artist: &str, theme: CoverTheme) -> String {
    let title = escape_xml(&truncate(title, TITLE_MAX));
    let artist = escape_xml(&truncate(artist, ARTIST_MAX));

    let grooves: String = (1..=5)
        .map(|i| {
            format!(
                r##"  <circle cx="200" cy="200" r="{}" fill="none" stroke="#ffffff" stroke-width="0.5" opacity="0.1" />
"##,
                200 - i * 20
            )
        })
        .collect();

    format!(
        r#"<svg width="400" height="400" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <radialGradient id="vinyl" cx="50%" cy="50%" r="50%">
      <stop offset="0%" style="stop-color:{dark};stop-opacity:1" />
      <stop offset="60%" style="stop-color:{secondary};stop-opacity:1" />
      <stop offset="100%" style="stop-color:{primary};stop-opacity:1" />
    </radialGradient>
    <radialGradient id="label" cx="50%" cy="50%" r="50%">
      <stop offset="0%" style="stop-color:{primary};stop-opacity:1" />
      <stop offset="100%" style="stop-color:{secondary};stop-opacity:1" />
    </radialGradient>
  </defs>
  <circle cx="200" cy="200" r="200" fill="url(#vinyl)" />
{grooves}  <circle cx="200" cy="200" r="80" fill="url(#label)" />
  <circle cx="200" cy="200" r="8" fill="{dark}" />
  <text x="200" y="180" text-anchor="middle" fill="white" font-family="Arial, sans-serif" font-size="16" font-weight="bold">{title}</text>
  <text x="200" y="200" text-anchor="middle" fill="white" font-family="Arial, sans-serif" font-size="12" opacity="0.8">{artist}</text>
  <text x="200" y="220" text-anchor="middle" fill="white" font-family="Arial, sans-serif" font-size="10" opacity="0.6">NeuroRadio</text>
</svg>
"#,
        primary = theme.primary,
        secondary = theme.secondary,
        dark = theme.dark,
        grooves = grooves,
        title = title,
        artist = artist,
    )
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
