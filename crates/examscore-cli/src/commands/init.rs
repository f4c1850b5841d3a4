//! The `examscore init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing("examscore.toml", SAMPLE_CONFIG)?;
    write_if_missing("answers.example.json", EXAMPLE_REQUEST)?;

    println!("\nNext steps:");
    println!("  1. Set [remote] url in examscore.toml, or leave it empty to score locally");
    println!("  2. Run: examscore score --answers answers.example.json");
    println!("  3. Run: examscore serve");

    Ok(())
}

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examscore configuration

[remote]
# External scoring service. An unset AI_SCORING_URL expands to "",
# which means local scoring only.
url = "${AI_SCORING_URL}"
timeout_secs = 60

[similarity]
filter_short_tokens = true
substring_bonus = false

[server]
host = "0.0.0.0"
port = 8080
"#;

const EXAMPLE_REQUEST: &str = r#"{
  "answers": [
    {
      "question_id": "q1",
      "key_answer": "The sky is blue",
      "student_answer": "sky is blue",
      "max_score": 10
    },
    {
      "question_id": "q2",
      "key_answer": "Photosynthesis converts light energy into chemical energy",
      "student_answer": "plants turn light into chemical energy",
      "max_score": 5
    }
  ]
}
"#;
