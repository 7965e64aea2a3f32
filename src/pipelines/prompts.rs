use crate::quiz::difficulty::{DifficultyModel, MAX_LEVEL, MIN_LEVEL};

pub fn summary_prompt(excerpt: &str) -> String {
    format!(
        r#"Summarize the main points of the following document in about 300 words.
Write plain prose without headings or lists.

Document:
{excerpt}
"#
    )
}

pub fn topics_prompt(excerpt: &str, max_topics: usize) -> String {
    format!(
        r#"Extract the {max_topics} most important topics or keywords from the following document.
Respond with the topics only, separated by commas, on a single line. No numbering, no explanations.

Document:
{excerpt}
"#
    )
}

fn difficulty_instruction(model: DifficultyModel) -> (String, String) {
    match model {
        DifficultyModel::Tiered => (
            "Assign a difficulty level: \"easy\", \"medium\" or \"hard\".".to_string(),
            r#""easy" | "medium" | "hard""#.to_string(),
        ),
        DifficultyModel::Numeric => (
            format!(
                "Assign a difficulty as an integer from {} (very easy) to {} (very hard).",
                MIN_LEVEL, MAX_LEVEL
            ),
            format!("an integer {}-{}", MIN_LEVEL, MAX_LEVEL),
        ),
    }
}

pub fn questions_prompt(
    topic: &str,
    excerpt: &str,
    count: usize,
    model: DifficultyModel,
) -> String {
    let (instruction, difficulty_shape) = difficulty_instruction(model);
    format!(
        r#"Based on the following topic and document content, generate {count} quiz questions.
Topic: {topic}

Document content:
{excerpt}

Rules:
1. Every question must relate to the topic and be answerable from the content.
2. Mix question types: multiple choice ("mcq"), fill in the blank ("fill_blank")
   and short answer ("short_answer").
3. Multiple choice questions have exactly 4 options. The correct answer is one
   of them, written identically.
4. Keep answers short so they can be checked by exact comparison.
5. {instruction}
6. For about 1 in 3 questions, use relevant general knowledge not stated in the
   content and mark its source "general_knowledge".

Respond with ONLY a JSON array. Each element has this shape:
{{
  "type": "mcq" | "fill_blank" | "short_answer",
  "question": "The question text",
  "options": ["A", "B", "C", "D"],
  "correct_answer": "The correct answer",
  "difficulty": {difficulty_shape},
  "topic": "{topic}",
  "source": "document" | "general_knowledge"
}}
Omit "options" for questions that are not multiple choice.
"#
    )
}

pub fn suggestions_prompt(weak_topics: &[String]) -> String {
    format!(
        r#"Based on the learner's quiz performance, they struggled most with these topics:
{}

Provide 3 concise suggestions for improvement, including recommended study resources or techniques.
Respond in plain text as a numbered list."#,
        weak_topics.join(", ")
    )
}
