/// Starter questions offered while a conversation is empty
pub const EXAMPLE_QUESTIONS: [&str; 4] = [
    "Get the latest review study on the GI toxicity of danuglipron",
    "What diseases are associated with EGFR",
    "Show me compounds similar to vemurafenib. Display their structures",
    "List all the drugs in the GLP-1 agonists ATC class in DrugBank",
];

/// Example question by 1-based number, as listed to the user
pub fn example_question(number: usize) -> Option<&'static str> {
    number.checked_sub(1).and_then(|i| EXAMPLE_QUESTIONS.get(i)).copied()
}
