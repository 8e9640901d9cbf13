use anyhow::{anyhow, Result};
use lopdf::{dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

/// Concatenates an ordered sequence of PDF buffers into one document.
///
/// The result's page count equals the sum of the inputs' page counts, and
/// page order follows the input sequence with each input's internal order
/// preserved. An empty input yields a valid zero-page document.
pub fn merge_pdfs(buffers: &[Vec<u8>]) -> Result<Vec<u8>> {
    if buffers.is_empty() {
        return serialize(&mut empty_document());
    }

    // The first buffer becomes the base document; every other buffer is
    // renumbered past its ids and copied in wholesale.
    let mut merged = Document::load_mem(&buffers[0])
        .map_err(|e| anyhow!("Failed to parse PDF buffer 1: {}", e))?;
    let mut page_ids: Vec<ObjectId> = merged.get_pages().into_values().collect();
    let mut max_id = merged.max_id;

    for (index, data) in buffers.iter().enumerate().skip(1) {
        let mut document = Document::load_mem(data)
            .map_err(|e| anyhow!("Failed to parse PDF buffer {}: {}", index + 1, e))?;

        document.renumber_objects_with(max_id + 1);
        max_id = document.max_id;

        debug!(
            "Merging buffer {} with {} pages",
            index + 1,
            document.get_pages().len()
        );

        page_ids.extend(document.get_pages().into_values());
        for (object_id, object) in document.objects.iter() {
            merged.objects.insert(*object_id, object.clone());
        }
    }

    merged.max_id = max_id;
    set_root_pages(&mut merged, &page_ids)?;

    info!(
        "Merged {} buffers into {} pages",
        buffers.len(),
        page_ids.len()
    );
    serialize(&mut merged)
}

/// Points the root Pages dictionary at the full ordered page list.
fn set_root_pages(document: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let pages_id = document
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| anyhow!("Merged PDF has no page tree root: {}", e))?;

    let pages = document
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| anyhow!("Merged PDF has a malformed page tree: {}", e))?;

    pages.set(
        "Kids",
        Object::Array(page_ids.iter().copied().map(Object::Reference).collect()),
    );
    pages.set("Count", page_ids.len() as i64);
    Ok(())
}

fn empty_document() -> Document {
    let mut document = Document::with_version("1.5");
    let pages_id = document.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Object::Array(Vec::new()),
        "Count" => 0i64,
    });
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    document
}

fn serialize(document: &mut Document) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    document
        .save_to(&mut data)
        .map_err(|e| anyhow!("Failed to serialize merged PDF: {}", e))?;
    Ok(data)
}
