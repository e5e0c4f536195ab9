//! The `daypo init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create daypo.toml
    if std::path::Path::new("daypo.toml").exists() {
        println!("daypo.toml already exists, skipping.");
    } else {
        std::fs::write("daypo.toml", SAMPLE_CONFIG)?;
        println!("Created daypo.toml");
    }

    // Create sample quiz
    std::fs::create_dir_all("quizzes")?;
    let sample_path = std::path::Path::new("quizzes/sample.xml");
    if sample_path.exists() {
        println!("quizzes/sample.xml already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_QUIZ)?;
        println!("Created quizzes/sample.xml");
    }

    println!("\nNext steps:");
    println!("  1. Run: daypo validate quizzes/sample.xml");
    println!("  2. Run: daypo take quizzes/sample.xml");
    println!("  3. Export your own tests from Daypo as XML and take them the same way");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# daypo configuration

# Where progress files go. Defaults to the directory of each quiz.
# progress_dir = "~/.local/share/daypo"

# What to do when saved progress exists: "ask", "always" or "never".
resume = "ask"

# Save after every answer, not only on exit.
autosave = true

# Fraction of correct answers needed to pass.
pass_threshold = 0.5
"#;

const SAMPLE_QUIZ: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<test>
  <p><t>Daypo Sample Quiz</t></p>
  <i>
    <i p="1">data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==</i>
  </i>
  <c>
    <c>
      <t>1</t>
      <p>Which planet is known as the Red Planet?</p>
      <r><o>Venus</o><o>Mars</o><o>Jupiter</o></r>
      <c>121</c>
    </c>
    <c>
      <t>1</t>
      <p>Which of these are prime numbers?</p>
      <r><o>2</o><o>4</o><o>5</o><o>9</o></r>
      <c>2121</c>
    </c>
    <c>
      <t>6</t>
      <p>Put these events in chronological order.</p>
      <r><o>Moon landing</o><o>First powered flight</o><o>World Wide Web</o></r>
      <c>020103</c>
    </c>
    <c>
      <t>1</t>
      <p>What does the exhibit show?</p>
      <b p="1"/>
      <r><o>A single pixel</o><o>A world map</o></r>
      <c>21</c>
    </c>
  </c>
</test>
"#;
