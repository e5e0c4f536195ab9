//! Daypo XML quiz parser.
//!
//! Loads a quiz from the compact Daypo export format and validates it.
//! The format uses single-letter element names:
//!
//! ```text
//! <test>
//!   <p><t>Title</t></p>
//!   <i><i p="img1">data:image/png;base64,....</i></i>
//!   <c>
//!     <c>
//!       <t>1</t>              type code: 1 = choice, 6 = ordering
//!       <p>Prompt</p>
//!       <b p="img1"/>         optional image reference
//!       <r><o>Option</o>...</r>
//!       <c>1211</c>           answer code
//!     </c>
//!   </c>
//! </test>
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine as _;
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::LoadError;
use crate::model::{Exhibit, Question, QuestionKind, Test, DEFAULT_TITLE};

/// Type code for single and multiple choice questions.
const TYPE_CHOICE: &str = "1";
/// Type code for ordering questions.
const TYPE_ORDERING: &str = "6";
/// Answer-code character marking a correct option.
const CORRECT_MARK: char = '2';
/// Ordering chunk meaning "last position".
const LAST_POSITION: &str = "00";

/// A problem found while loading a quiz that did not stop the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// 1-based position of the question node in the source file.
    pub question: Option<usize>,
    pub message: String,
}

/// A successfully loaded quiz and what had to be skipped to load it.
#[derive(Debug, Clone)]
pub struct ParsedQuiz {
    pub test: Test,
    pub warnings: Vec<LoadWarning>,
}

/// Parse a Daypo XML file.
pub fn parse_quiz(path: &Path) -> Result<ParsedQuiz, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_quiz_str(&content, path)
}

/// Parse a Daypo XML string (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<ParsedQuiz, LoadError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(content, options).map_err(|source| LoadError::Xml {
        path: source_path.to_path_buf(),
        source,
    })?;
    let root = doc.root_element();

    let mut warnings = Vec::new();
    let title = parse_title(root);
    let images = parse_images(root, &mut warnings);

    let container = child(root, "c")
        .ok_or_else(|| LoadError::MissingContainer(source_path.to_path_buf()))?;

    let mut questions = Vec::new();
    for (position, node) in children(container, "c").enumerate() {
        let position = position + 1;
        match parse_question(node, questions.len() + 1, &images) {
            Ok((question, notes)) => {
                warnings.extend(notes.into_iter().map(|message| LoadWarning {
                    question: Some(position),
                    message,
                }));
                questions.push(question);
            }
            Err(reason) => warnings.push(LoadWarning {
                question: Some(position),
                message: format!("skipped: {reason}"),
            }),
        }
    }

    for w in &warnings {
        match w.question {
            Some(n) => tracing::warn!("{}: question {n}: {}", source_path.display(), w.message),
            None => tracing::warn!("{}: {}", source_path.display(), w.message),
        }
    }

    if questions.is_empty() {
        return Err(LoadError::NoQuestions(source_path.to_path_buf()));
    }

    tracing::debug!(
        "loaded {} questions from {} ({} skipped)",
        questions.len(),
        source_path.display(),
        warnings.iter().filter(|w| w.message.starts_with("skipped")).count()
    );

    Ok(ParsedQuiz {
        test: Test::new(title, questions),
        warnings,
    })
}

/// Recursively load all `.xml` quiz files from a directory.
///
/// Files that fail to load are logged and skipped.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<(PathBuf, ParsedQuiz)>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push((path, quiz)),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &'static str) -> Option<Node<'a, 'input>> {
    children(node, name).next()
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// All text below `node`, concatenated in document order.
fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn parse_title(root: Node<'_, '_>) -> String {
    root.descendants()
        .skip(1)
        .filter(|n| n.is_element() && n.tag_name().name() == "p")
        .find_map(|p| child(p, "t"))
        .and_then(|t| t.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

fn parse_images(root: Node<'_, '_>, warnings: &mut Vec<LoadWarning>) -> HashMap<String, Exhibit> {
    let mut images = HashMap::new();
    let Some(container) = child(root, "i") else {
        return images;
    };

    for node in children(container, "i") {
        let (Some(key), Some(text)) = (node.attribute("p"), node.text()) else {
            continue;
        };
        if key.is_empty() || text.trim().is_empty() {
            continue;
        }
        match decode_data_url(text) {
            Some((mime, data)) => {
                images.insert(
                    key.to_string(),
                    Exhibit {
                        key: key.to_string(),
                        mime,
                        data,
                    },
                );
            }
            None => warnings.push(LoadWarning {
                question: None,
                message: format!("could not decode image with key {key}"),
            }),
        }
    }

    images
}

/// Split a `data:<mime>;base64,<payload>` URL and decode the payload.
fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let (header, payload) = url.trim().split_once(',')?;
    let mime = header
        .strip_prefix("data:")
        .and_then(|h| h.split(';').next())
        .filter(|m| !m.is_empty())
        .unwrap_or("application/octet-stream")
        .to_string();
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .ok()?;
    Some((mime, data))
}

/// Parse one question node. Returns the question plus non-fatal notes, or
/// the reason the node was skipped.
fn parse_question(
    node: Node<'_, '_>,
    id: usize,
    images: &HashMap<String, Exhibit>,
) -> std::result::Result<(Question, Vec<String>), String> {
    let type_code = child(node, "t")
        .and_then(|t| t.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("missing type code")?;

    let prompt = child(node, "p").ok_or("missing prompt")?;
    let text = inner_text(prompt).trim().to_string();

    let exhibit = child(node, "b")
        .and_then(|b| b.attribute("p"))
        .and_then(|key| images.get(key))
        .cloned();

    let mut options: Vec<String> = node
        .descendants()
        .skip(1)
        .filter(|n| n.is_element() && n.tag_name().name() == "r")
        .flat_map(|r| children(r, "o"))
        .map(|o| o.text().map(str::trim).unwrap_or_default().to_string())
        .collect();

    let answer_code = child(node, "c")
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or("missing answer code")?;

    let (mut kind, mut correct_indices) = match type_code {
        TYPE_CHOICE => {
            let correct: Vec<usize> = answer_code
                .chars()
                .enumerate()
                .filter(|&(_, code)| code == CORRECT_MARK)
                .map(|(i, _)| i)
                .collect();
            (QuestionKind::Multiple, correct)
        }
        TYPE_ORDERING => {
            if options.len() == 1 && options[0].contains(' ') {
                options = options[0].split_whitespace().map(String::from).collect();
            }
            (QuestionKind::Ordering, ordering_sequence(answer_code, options.len())?)
        }
        other => return Err(format!("unsupported question type code {other}")),
    };

    let mut notes = Vec::new();
    let option_count = options.len();
    let before = correct_indices.len();
    correct_indices.retain(|&i| i < option_count);
    if correct_indices.len() != before {
        notes.push(format!(
            "answer code names {} option(s) that do not exist",
            before - correct_indices.len()
        ));
    }

    if kind != QuestionKind::Ordering && correct_indices.len() == 1 {
        kind = QuestionKind::Single;
    }

    if options.is_empty() {
        return Err("no options".into());
    }
    if correct_indices.is_empty() {
        return Err("no correct answer".into());
    }

    let mut question = Question::new(id, text, kind, options, correct_indices);
    question.exhibit = exhibit;
    Ok((question, notes))
}

/// Decode an ordering answer code into the option indices in correct order.
///
/// The code holds one two-digit, 1-based target position per option; `00`
/// stands for the last position.
fn ordering_sequence(answer_code: &str, option_count: usize) -> std::result::Result<Vec<usize>, String> {
    let digits: Vec<char> = answer_code.chars().filter(|c| !c.is_whitespace()).collect();

    let mut placed = Vec::new();
    for (index, chunk) in digits.chunks(2).take(option_count).enumerate() {
        let chunk: String = chunk.iter().collect();
        let position = if chunk == LAST_POSITION {
            option_count
        } else {
            chunk
                .parse::<usize>()
                .map_err(|_| format!("invalid ordering position {chunk:?}"))?
        };
        placed.push((position, index));
    }

    placed.sort();
    Ok(placed.into_iter().map(|(_, index)| index).collect())
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a loaded quiz for issues that do not prevent taking it.
pub fn validate_quiz(test: &Test) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Progress is matched by prompt text, so duplicates share saved state
    let mut seen = HashSet::new();
    for q in &test.questions {
        if !q.text.is_empty() && !seen.insert(q.text.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!("duplicate prompt: {}", truncate(&q.text, 60)),
            });
        }
    }

    for q in &test.questions {
        if q.text.is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "prompt is empty".into(),
            });
        }
    }

    for q in &test.questions {
        let empty = q.options.iter().filter(|o| o.is_empty()).count();
        if empty > 0 {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!("{empty} option(s) have no text"),
            });
        }
    }

    for q in &test.questions {
        if q.kind == QuestionKind::Ordering && q.options.len() < 2 {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "ordering question has fewer than two options".into(),
            });
        }
        // Answers must place every option, so a short code is never matched
        if q.kind == QuestionKind::Ordering && q.correct_indices.len() < q.options.len() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!(
                    "answer code orders {} of {} options, so no answer can be correct",
                    q.correct_indices.len(),
                    q.options.len()
                ),
            });
        }
    }

    warnings
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    }
}
