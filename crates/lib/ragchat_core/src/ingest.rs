//! Document ingestion: load → split → embed → store.
//!
//! [`ingest_folder`] walks every file under a directory, loads it according
//! to its extension, splits the text into chunks, embeds them, and adds them
//! to a [`VectorStore`].
//!
//! | Extension            | Loader                                         |
//! |----------------------|------------------------------------------------|
//! | `.txt`, `.md`, `.text` | whole file as one document                   |
//! | `.csv`               | one document per row, `header: value` lines    |
//! | `.pdf`               | text of every page, joined by newlines         |
//! | anything else        | UTF-8 text if it decodes, otherwise skipped    |
//!
//! Files that cannot be loaded are logged and skipped. Embedding or store
//! failures abort the run.

use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::embedding::{Embedder, EmbeddingError};
use crate::splitter::TextSplitter;
use crate::store::{Chunk, StoreError, VectorStore};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store failed: {0}")]
    Store(#[from] StoreError),
}

/// Reasons a single file is skipped.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("not valid UTF-8 text")]
    NotText,

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unreadable PDF: {0}")]
    Pdf(String),
}

/// Text loaded from one file (or one CSV row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub source: String,
}

/// Totals for one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Files found (directories excluded).
    pub files: usize,
    /// Files that could not be loaded.
    pub skipped: usize,
    /// Chunks written to the store.
    pub chunks: usize,
}

enum Loader {
    Text,
    Csv,
    Pdf,
    Unstructured,
}

fn loader_for(path: &Path) -> Loader {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "md" | "text" => Loader::Text,
        "csv" => Loader::Csv,
        "pdf" => Loader::Pdf,
        _ => Loader::Unstructured,
    }
}

/// Load the documents contained in `path`.
pub async fn load_file(path: &Path) -> Result<Vec<Document>, LoadError> {
    let source = path.display().to_string();
    let bytes = tokio::fs::read(path).await?;

    match loader_for(path) {
        Loader::Pdf => {
            let content = tokio::task::spawn_blocking(move || pdf_text(&bytes))
                .await
                .map_err(|e| LoadError::Pdf(e.to_string()))??;
            Ok(vec![Document { content, source }])
        }
        Loader::Csv => {
            let text = String::from_utf8(bytes).map_err(|_| LoadError::NotText)?;
            Ok(csv_documents(&text)?
                .into_iter()
                .map(|content| Document {
                    content,
                    source: source.clone(),
                })
                .collect())
        }
        Loader::Text | Loader::Unstructured => {
            let content = String::from_utf8(bytes).map_err(|_| LoadError::NotText)?;
            Ok(vec![Document { content, source }])
        }
    }
}

/// Page texts in page order, one `\n` between pages.
fn pdf_text(bytes: &[u8]) -> Result<String, LoadError> {
    let pdf = lopdf::Document::load_mem(bytes).map_err(|e| LoadError::Pdf(e.to_string()))?;
    let pages = pdf
        .get_pages()
        .into_keys()
        .map(|page| pdf.extract_text(&[page]))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LoadError::Pdf(e.to_string()))?;
    Ok(pages.join("\n"))
}

/// Render each data row as `header: value` lines. Short rows leave the
/// missing columns empty.
fn csv_documents(text: &str) -> Result<Vec<String>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut documents = Vec::new();
    for record in reader.records() {
        let record = record?;
        let lines: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| format!("{}: {}", header.trim(), record.get(i).unwrap_or("").trim()))
            .collect();
        documents.push(lines.join("\n"));
    }
    Ok(documents)
}

/// Every file below `data_dir`, sorted by path.
fn list_files(data_dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let root = glob::Pattern::escape(&data_dir.to_string_lossy());
    let pattern = format!("{}/**/*", root.trim_end_matches('/'));
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|path| !path.is_dir())
        .collect();
    files.sort();
    Ok(files)
}

/// Ingest every file under `data_dir` into `store`.
///
/// Chunk ids are `{file_name}-{n}` where `n` counts chunks across the whole
/// run, so re-ingesting the same folder replaces the previous chunks.
pub async fn ingest_folder(
    data_dir: &Path,
    splitter: &TextSplitter,
    embedder: &Embedder,
    store: &dyn VectorStore,
) -> Result<IngestReport, IngestError> {
    if !data_dir.is_dir() {
        return Err(IngestError::NotADirectory(data_dir.to_path_buf()));
    }

    let mut report = IngestReport::default();
    let mut next_id = 0usize;

    for path in list_files(data_dir)? {
        report.files += 1;

        let documents = match load_file(&path).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                report.skipped += 1;
                continue;
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = path.display().to_string();

        let mut ids = Vec::new();
        let mut texts = Vec::new();
        for document in &documents {
            for piece in splitter.split_text(&document.content) {
                ids.push(format!("{file_name}-{next_id}"));
                next_id += 1;
                texts.push(piece);
            }
        }
        if texts.is_empty() {
            info!("No text found in {}", path.display());
            continue;
        }

        let embeddings = embedder.embed_documents(&texts).await?;
        let chunks: Vec<Chunk> = ids
            .into_iter()
            .zip(texts)
            .zip(embeddings)
            .enumerate()
            .map(|(chunk_index, ((id, content), embedding))| Chunk {
                id,
                content,
                source: source.clone(),
                chunk_index,
                embedding,
            })
            .collect();

        let written = store.add(chunks).await?;
        info!("Ingested {written} chunks from {}", path.display());
        report.chunks += written;
    }

    info!(
        "Ingestion complete: {} chunks from {} files ({} skipped)",
        report.chunks, report.files, report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::config::EmbeddingConfig;
    use crate::embedding::local;
    use crate::store::LocalVectorStore;

    #[test]
    fn csv_rows_become_documents() {
        let docs = csv_documents("name,role\nAda, engineer \nGrace,admiral\n").unwrap();
        assert_eq!(docs, vec!["name: Ada\nrole: engineer", "name: Grace\nrole: admiral"]);
    }

    #[test]
    fn csv_handles_quotes_and_crlf() {
        let docs = csv_documents("a,b\r\n\"x, y\",\"say \"\"hi\"\"\"\r\n\"multi\nline\",z").unwrap();
        assert_eq!(docs, vec!["a: x, y\nb: say \"hi\"", "a: multi\nline\nb: z"]);
    }

    #[test]
    fn csv_short_rows_and_blank_lines() {
        let docs = csv_documents("a,b\n\n1\n").unwrap();
        assert_eq!(docs, vec!["a: 1\nb: "]);
        assert!(csv_documents("").unwrap().is_empty());
    }

    #[test]
    fn csv_extra_columns_are_ignored() {
        let docs = csv_documents("a\n1,2,3\n").unwrap();
        assert_eq!(docs, vec!["a: 1"]);
    }

    /// Minimal PDF with one line of Helvetica text per page.
    fn write_pdf(path: &Path, pages: &[&str]) {
        use lopdf::content::{Content, Operation};
        use lopdf::{Object, Stream, dictionary};

        let mut pdf = lopdf::Document::with_version("1.5");
        let pages_id = pdf.new_object_id();
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = pdf.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                pdf.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = pdf.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        pdf.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        pdf.trailer.set("Root", catalog_id);
        pdf.save(path).unwrap();
    }

    #[tokio::test]
    async fn pdf_pages_are_joined_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.pdf");
        write_pdf(&path, &["Kubernetes schedules containers", "Helm packages charts"]);

        let docs = load_file(&path).await.unwrap();
        assert_eq!(docs.len(), 1);
        let text = &docs[0].content;
        let first = text.find("Kubernetes schedules containers").unwrap();
        let second = text.find("Helm packages charts").unwrap();
        assert!(first < second);
        assert!(text[first..second].contains('\n'));
        assert!(docs[0].source.ends_with("guide.pdf"));
    }

    #[tokio::test]
    async fn broken_pdf_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        assert!(matches!(load_file(&path).await, Err(LoadError::Pdf(_))));
    }

    #[tokio::test]
    async fn ingested_pdf_is_searchable() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(&dir.path().join("guide.pdf"), &["Kubernetes schedules containers"]);
        std::fs::write(dir.path().join("notes.txt"), "Unrelated shopping list.").unwrap();

        let store = LocalVectorStore::in_memory("test");
        let embedder = Embedder::new(EmbeddingConfig::local(16));
        let report = ingest_folder(dir.path(), &TextSplitter::default(), &embedder, &store)
            .await
            .unwrap();
        assert_eq!(report.skipped, 0);
        assert_eq!(report.chunks, 2);

        let loaded = load_file(&dir.path().join("guide.pdf")).await.unwrap();
        let query = local::embed(loaded[0].content.trim(), 16);
        let hit = &store.similarity_search(&query, 1).await.unwrap()[0];
        assert_eq!(hit.chunk.id, "guide.pdf-0");
        assert!(hit.chunk.source.ends_with("guide.pdf"));
        assert!(hit.chunk.content.contains("Kubernetes schedules containers"));
    }

    #[tokio::test]
    async fn ingest_folder_walks_loads_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Docker is a container platform.").unwrap();
        std::fs::write(dir.path().join("b.csv"), "tool,kind\ndocker,runtime\nhelm,packager\n")
            .unwrap();
        std::fs::write(dir.path().join("c.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("d.bin"), [0xff, 0xfe, 0x00]).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("e.md"), "# Notes\n\nKubernetes.").unwrap();
        std::fs::write(dir.path().join("empty.txt"), "   ").unwrap();

        let store = LocalVectorStore::in_memory("test");
        let embedder = Embedder::new(EmbeddingConfig::local(16));
        let report = ingest_folder(dir.path(), &TextSplitter::default(), &embedder, &store)
            .await
            .unwrap();

        assert_eq!(
            report,
            IngestReport {
                files: 6,
                skipped: 2,
                chunks: 4,
            }
        );
        assert_eq!(store.count().await.unwrap(), 4);

        let query = local::embed("Docker is a container platform.", 16);
        let hit = &store.similarity_search(&query, 1).await.unwrap()[0];
        assert_eq!(hit.chunk.id, "a.txt-0");
        assert_eq!(hit.chunk.chunk_index, 0);
        assert!(hit.chunk.source.ends_with("a.txt"));

        let query = local::embed("tool: helm\nkind: packager", 16);
        let hit = &store.similarity_search(&query, 1).await.unwrap()[0];
        assert_eq!(hit.chunk.id, "b.csv-2");
        assert_eq!(hit.chunk.chunk_index, 1);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let store = LocalVectorStore::in_memory("test");
        let embedder = Embedder::new(EmbeddingConfig::local(16));
        let err = ingest_folder(
            Path::new("/definitely/not/here"),
            &TextSplitter::default(),
            &embedder,
            &store,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, IngestError::NotADirectory(_)));
    }
}
