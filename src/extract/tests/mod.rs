
use crate::snapshot::ContentNode;

/// Visible text of a Spanish-interface ad container
pub(super) fn spanish_ad_text(name: &str, library_id: &str, date: Option<&str>, body: &str) -> String {
    let mut lines = vec![
        name.to_string(),
        "Activo".to_string(),
        format!("Identificador de la biblioteca: {library_id}"),
    ];
    if let Some(date) = date {
        lines.push(format!("En circulación desde el {date}"));
    }
    lines.push("Plataformas".to_string());
    lines.push(body.to_string());
    lines.push("Ver detalles del anuncio".to_string());
    lines.join("\n")
}

/// An ad container as the browser renders it: the card itself, a nested
/// wrapper repeating the same text, and a short fragment holding the id
pub(super) fn ad_container(text: &str, library_id: &str) -> ContentNode {
    let fragment = ContentNode::new(format!("Identificador de la biblioteca: {library_id}"));
    let wrapper = ContentNode::new(text).with_child(fragment);
    ContentNode::new(text).with_child(wrapper)
}

/// A results page holding the given containers
///
/// The page's own text swallows every ad plus the surrounding chrome, which
/// keeps it above the container length band.
pub(super) fn results_page(containers: Vec<ContentNode>) -> ContentNode {
    let joined = containers
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let mut page = ContentNode::new(format!(
        "Biblioteca de anuncios\n{} resultados\n{}\n{}",
        containers.len(),
        joined,
        "Filtros ".repeat(400)
    ));
    for container in containers {
        page.images.extend(container.images.iter().cloned());
        page.links.extend(container.links.iter().cloned());
        page.children.push(container);
    }
    page
}

pub(super) fn library_id(n: usize) -> String {
    format!("{}", 100_000_000_000_000u64 + n as u64)
}
