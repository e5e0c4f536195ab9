//! Text rendering of questions, feedback and results.

use comfy_table::{Cell, Table};

use daypo_core::model::{Question, QuestionKind, Test};
use daypo_core::Summary;

/// The current question with its options and, once answered, feedback.
pub fn question(test: &Test, q: &Question) -> String {
    let mut out = String::new();
    let hint = match q.kind {
        QuestionKind::Single => "choose one",
        QuestionKind::Multiple => "choose all that apply",
        QuestionKind::Ordering => "give each item its position",
    };

    out.push_str(&format!("\n== {} ==\n", test.title));
    out.push_str(&format!(
        "Question {} of {} ({hint})\n\n",
        test.current_index + 1,
        test.len()
    ));
    out.push_str(&q.text);
    out.push('\n');

    if let Some(exhibit) = &q.exhibit {
        out.push_str(&format!(
            "[Exhibit: {}, {} bytes. Type 'x' to save it]\n",
            exhibit.mime,
            exhibit.data.len()
        ));
    }
    out.push('\n');

    for (i, option) in q.options.iter().enumerate() {
        let marker = match q.kind {
            QuestionKind::Ordering => match q.response.raw_input.get(i) {
                Some(position) if q.is_answered => format!("[{position}]"),
                _ => "[ ]".to_string(),
            },
            QuestionKind::Single if q.is_selected(i) => "(*)".to_string(),
            QuestionKind::Single => "( )".to_string(),
            QuestionKind::Multiple if q.is_selected(i) => "[x]".to_string(),
            QuestionKind::Multiple => "[ ]".to_string(),
        };
        let note = if q.is_answered && q.kind != QuestionKind::Ordering && q.is_correct == Some(false)
        {
            if q.is_correct_option(i) {
                "  <- correct"
            } else if q.is_selected(i) {
                "  <- wrong"
            } else {
                ""
            }
        } else {
            ""
        };
        out.push_str(&format!("  {}. {marker} {option}{note}\n", i + 1));
    }

    if q.is_answered {
        out.push('\n');
        out.push_str(&feedback(q));
    } else if q.kind == QuestionKind::Ordering {
        out.push_str(&format!(
            "\nEnter the position of each item in the order listed, e.g. {}\n",
            example_order(q.options.len())
        ));
    }

    out
}

fn example_order(count: usize) -> String {
    (1..=count)
        .rev()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Verdict for an answered question.
pub fn feedback(q: &Question) -> String {
    match (q.is_correct, q.kind) {
        (Some(true), _) => "Correct!\n".to_string(),
        (_, QuestionKind::Ordering) => {
            let mut out = String::from("Incorrect. The correct order is:\n");
            for (i, option) in q.correct_options().iter().enumerate() {
                out.push_str(&format!("{}. {option}\n", i + 1));
            }
            out
        }
        _ => {
            let mut out = String::from("Incorrect. The correct answer(s) were:\n");
            for option in q.correct_options() {
                out.push_str(&format!("- {option}\n"));
            }
            out
        }
    }
}

/// One-line running score.
pub fn status(test: &Test) -> String {
    format!(
        "Question: {} of {} | Correct: {} | Incorrect: {}",
        test.current_index + 1,
        test.len(),
        test.num_correct(),
        test.num_incorrect()
    )
}

/// End-of-test results table.
pub fn summary(summary: &Summary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Result", "Value"]);
    table.add_row(vec![Cell::new("Total Questions"), Cell::new(summary.total)]);
    table.add_row(vec![Cell::new("Correct Answers"), Cell::new(summary.correct)]);
    table.add_row(vec![
        Cell::new("Incorrect Answers"),
        Cell::new(summary.incorrect),
    ]);
    table.add_row(vec![Cell::new("Unanswered"), Cell::new(summary.unanswered)]);
    table.add_row(vec![
        Cell::new("Score"),
        Cell::new(format!("{:.1}%", summary.score * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Outcome"),
        Cell::new(if summary.passed { "PASS" } else { "FAIL" }),
    ]);

    format!("\nTest Finished! {}\n\n{table}\n", summary.title)
}

pub const HELP: &str = "\
Commands:
  1 | 1,3 | 1 3   answer; for ordering, the position of each item in listed order
  - | none        submit a multiple choice question with nothing selected
  n               next question (shows the results after the last one)
  p               previous question
  g <number>      go to a question
  s               save progress
  x [path]        save the exhibit image
  q               save and quit
  h, ?            show this help
";

#[cfg(test)]
mod tests {
    use super::*;

    fn ordering() -> Question {
        Question::new(
            1,
            "Smallest first",
            QuestionKind::Ordering,
            vec!["ten".into(), "one".into(), "five".into()],
            vec![1, 2, 0],
        )
    }

    #[test]
    fn ordering_feedback_lists_sequence() {
        let mut q = ordering();
        q.is_answered = true;
        q.is_correct = Some(false);
        assert_eq!(
            feedback(&q),
            "Incorrect. The correct order is:\n1. one\n2. five\n3. ten\n"
        );
    }

    #[test]
    fn choice_feedback_marks_options() {
        let mut q = Question::new(
            1,
            "Pick even",
            QuestionKind::Multiple,
            vec!["1".into(), "2".into(), "4".into()],
            vec![1, 2],
        );
        q.response.answer_indices = vec![0, 1];
        q.is_answered = true;
        q.is_correct = Some(false);
        let test = Test::new("Numbers", vec![q.clone()]);

        let text = question(&test, &q);
        assert!(text.contains("1. [x] 1  <- wrong"));
        assert!(text.contains("3. [ ] 4  <- correct"));
        assert!(text.contains("Incorrect. The correct answer(s) were:\n- 2\n- 4\n"));
    }

    #[test]
    fn unanswered_ordering_shows_hint() {
        let q = ordering();
        let test = Test::new("Numbers", vec![q.clone()]);
        let text = question(&test, &q);
        assert!(text.contains("Question 1 of 1"));
        assert!(text.contains("e.g. 3 2 1"));
    }

    #[test]
    fn status_line() {
        let test = Test::new("Numbers", vec![ordering()]);
        assert_eq!(
            status(&test),
            "Question: 1 of 1 | Correct: 0 | Incorrect: 0"
        );
    }
}
