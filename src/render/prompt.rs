//! README generation prompts.

use crate::domain::LoadedContent;

pub const SYSTEM_PROMPT: &str = "You are an expert technical writer who produces clear, \
accurate README files for software repositories. Work only from the repository material you \
are given.";

const SECTIONS: &[&str] = &[
    "Project Title",
    "Brief Description",
    "Key Features",
    "Technologies Used",
    "Basic Installation & Usage",
    "License (if found)",
];

/// Wrap a file's text with its path, the unit handed to the chunk assembler.
pub fn frame_file(content: &LoadedContent) -> LoadedContent {
    LoadedContent::new(
        content.relative_path.clone(),
        format!("File: {}\n\n{}\n\n", content.relative_path, content.text),
    )
}

/// Prompt for one assembled chunk. `part` is 1-based.
pub fn readme_prompt(chunk: &str, part: usize, total: usize, tree: Option<&str>) -> String {
    let mut prompt = String::from(
        "Based on the following repository contents, generate a comprehensive README.md file.\n\n",
    );
    prompt.push_str("Include these sections:\n");
    for (idx, section) in SECTIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", idx + 1, section));
    }
    prompt.push_str(
        "\nKeep it informative and format it with Markdown. \
It should cover all the necessary contents in the repository.\n",
    );
    if total > 1 {
        prompt.push_str(&format!(
            "\nThis is part {part} of {total} of the repository contents. \
Describe what this part shows.\n"
        ));
    }
    if let Some(tree) = tree {
        prompt.push_str(&format!("\nRepository structure:\n{tree}\n"));
    }
    prompt.push_str(&format!("\nRepository contents:\n\n{chunk}\n\nREADME.md:"));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_file() {
        let framed = frame_file(&LoadedContent::new("src/app.py", "print(1)"));
        assert_eq!(framed.relative_path, "src/app.py");
        assert_eq!(framed.text, "File: src/app.py\n\nprint(1)\n\n");
    }

    #[test]
    fn test_single_part_prompt() {
        let prompt = readme_prompt("File: a.py\n\nx = 1", 1, 1, None);
        assert!(prompt.contains("1. Project Title"));
        assert!(prompt.contains("6. License (if found)"));
        assert!(prompt.contains("x = 1"));
        assert!(!prompt.contains("part 1 of"));
        assert!(prompt.ends_with("README.md:"));
    }

    #[test]
    fn test_multi_part_prompt_mentions_part_and_tree() {
        let prompt = readme_prompt("chunk", 2, 3, Some("demo/\n└── a.py"));
        assert!(prompt.contains("part 2 of 3"));
        assert!(prompt.contains("└── a.py"));
    }
}
