//! Landing-page renderer — pure template over a `CopyDocument`.

use super::copy::{CopyDocument, SectionKey};

/// Render the minimalist landing page HTML.
///
/// Null-safe: missing sections render as empty slots. List-style sections
/// (benefits, features, applications, testimonials, faq) are treated as
/// newline-delimited and rendered as repeated elements, skipping blanks.
pub fn render(copy: &CopyDocument) -> String {
    let headline = copy.text(SectionKey::Headline).trim();
    let seo_title = copy
        .text(SectionKey::Seo)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty());
    // Title preference: SEO title, then headline, then a fixed fallback.
    let title = match (seo_title, headline) {
        (Some(seo), _) => seo,
        (None, "") => "Landing Page",
        (None, headline) => headline,
    };
    let description = seo_title.unwrap_or("").replace('"', "&quot;");

    format!(
        r##"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <meta name="description" content="{description}">
  <style>
    body {{ font-family: Arial, sans-serif; margin: 0; padding: 0; background: #f9f9f9; color: #222; }}
    .container {{ max-width: 700px; margin: 0 auto; padding: 2rem; background: #fff; box-shadow: 0 2px 8px #0001; }}
    h1, h2, h3 {{ color: #1a237e; }}
    ul {{ padding-left: 1.2em; }}
    .cta {{ display: block; margin: 2rem 0; padding: 1rem; background: #1a237e; color: #fff; text-align: center; border-radius: 6px; text-decoration: none; font-weight: bold; }}
    .testimonials {{ background: #f1f8e9; padding: 1em; border-radius: 6px; margin: 1em 0; }}
    .faq {{ background: #e3f2fd; padding: 1em; border-radius: 6px; margin: 1em 0; }}
    .urgency {{ color: #c62828; font-weight: bold; }}
    .guarantee {{ color: #388e3c; font-weight: bold; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>{headline}</h1>
    <h2>{subheadline}</h2>
    <p>{opening}</p>
    <h3>Beneficios Clave</h3>
    <ul>{benefits}</ul>
    <h3>¿Cuál es el problema y cómo lo resolvemos?</h3>
    <p>{problem_solution}</p>
    <h3>Características Técnicas</h3>
    <ul>{features}</ul>
    <h3>Aplicaciones</h3>
    <ul>{applications}</ul>
    <div class="testimonials">
      <h3>Testimonios</h3>
      {testimonials}
    </div>
    <h3>Oferta Especial</h3>
    <p>{offer}</p>
    <a class="cta" href="#form">{cta}</a>
    <div class="faq">
      <h3>Preguntas Frecuentes</h3>
      {faq}
    </div>
    <p class="urgency">{urgency}</p>
    <p class="guarantee">{guarantee}</p>
  </div>
</body>
</html>"##,
        title = title,
        description = description,
        headline = copy.text(SectionKey::Headline),
        subheadline = copy.text(SectionKey::Subheadline),
        opening = copy.text(SectionKey::OpeningParagraph),
        benefits = list_items(copy.text(SectionKey::Benefits)),
        problem_solution = copy.text(SectionKey::ProblemSolution),
        features = list_items(copy.text(SectionKey::Features)),
        applications = list_items(copy.text(SectionKey::Applications)),
        testimonials = quoted_paragraphs(copy.text(SectionKey::Testimonials)),
        offer = copy.text(SectionKey::Offer),
        cta = copy.text(SectionKey::Cta),
        faq = paragraphs(copy.text(SectionKey::Faq)),
        urgency = copy.text(SectionKey::Urgency),
        guarantee = copy.text(SectionKey::Guarantee),
    )
}

/// Newline-delimited text → `<li>` items, blank lines skipped.
fn list_items(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| format!("<li>{l}</li>"))
        .collect()
}

/// Newline-delimited text → plain paragraphs, blank lines skipped.
fn paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| format!("<p>{l}</p>"))
        .collect()
}

/// Newline-delimited testimonials → quoted paragraphs.
fn quoted_paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| format!("<p>“{l}”</p>"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_renders_valid_html() {
        let html = render(&CopyDocument::new());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Landing Page</title>"));
        assert!(html.ends_with("</html>"));
        assert!(!html.contains("null"));
        assert!(!html.contains("undefined"));
        // Empty list slots collapse to empty elements, not broken markup.
        assert!(html.contains("<ul></ul>"));
    }

    #[test]
    fn headline_becomes_title() {
        let mut copy = CopyDocument::new();
        copy.set(SectionKey::Headline, "Duplica tus ventas".to_string());
        let html = render(&copy);
        assert!(html.contains("<title>Duplica tus ventas</title>"));
        assert!(html.contains("<h1>Duplica tus ventas</h1>"));
    }

    #[test]
    fn benefits_render_as_list_items_skipping_blanks() {
        let mut copy = CopyDocument::new();
        copy.set(
            SectionKey::Benefits,
            "Más clientes\n\n  Mejor margen  \n".to_string(),
        );
        let html = render(&copy);
        assert!(html.contains("<li>Más clientes</li><li>Mejor margen</li>"));
    }

    #[test]
    fn testimonials_are_quoted() {
        let mut copy = CopyDocument::new();
        copy.set(SectionKey::Testimonials, "Excelente servicio".to_string());
        let html = render(&copy);
        assert!(html.contains("<p>“Excelente servicio”</p>"));
    }

    #[test]
    fn seo_title_takes_precedence_over_headline() {
        let mut copy = CopyDocument::new();
        copy.set(SectionKey::Headline, "Duplica tus ventas".to_string());
        copy.set(SectionKey::Seo, "Panadería Sol | Pan artesanal".to_string());
        let html = render(&copy);
        assert!(html.contains("<title>Panadería Sol | Pan artesanal</title>"));
        assert!(html.contains("<h1>Duplica tus ventas</h1>"));
    }

    #[test]
    fn seo_first_line_feeds_meta_description() {
        let mut copy = CopyDocument::new();
        copy.set(
            SectionKey::Seo,
            "\nAgencia de marketing \"líder\"\npalabras clave".to_string(),
        );
        let html = render(&copy);
        assert!(html.contains(
            r#"<meta name="description" content="Agencia de marketing &quot;líder&quot;">"#
        ));
    }
}
