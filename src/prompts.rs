use crate::models::{Example, Problem};

/// Maximum number of roadmap topics interpolated into a problem prompt
pub const MAX_PROBLEM_TOPICS: usize = 10;

/// Everything a prompt can be rendered from
#[derive(Debug, Clone)]
pub enum PromptRequest<'a> {
    Roadmap {
        language: &'a str,
    },
    Problems {
        topics: &'a [String],
    },
    Quiz,
    Validate {
        problem: &'a Problem,
        user_solution: &'a str,
    },
    Explanation {
        course_title: &'a str,
        module_title: &'a str,
        subtopic: &'a str,
    },
}

impl PromptRequest<'_> {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            PromptRequest::Roadmap { .. } => "roadmap",
            PromptRequest::Problems { .. } => "problems",
            PromptRequest::Quiz => "quiz",
            PromptRequest::Validate { .. } => "validation",
            PromptRequest::Explanation { .. } => "explanation",
        }
    }
}

pub fn build_prompt(request: &PromptRequest<'_>) -> String {
    match request {
        PromptRequest::Roadmap { language } => roadmap_prompt(language),
        PromptRequest::Problems { topics } => problems_prompt(topics),
        PromptRequest::Quiz => QUIZ_PROMPT.to_string(),
        PromptRequest::Validate {
            problem,
            user_solution,
        } => validation_prompt(problem, user_solution),
        PromptRequest::Explanation {
            course_title,
            module_title,
            subtopic,
        } => explanation_prompt(course_title, module_title, subtopic),
    }
}

fn roadmap_prompt(language: &str) -> String {
    format!(
        r##"Create a detailed learning roadmap for {language} programming language.
Structure the response as a JSON object with the following format:

{{
  "name": "{language} Fundamentals",
  "icon": "💻",
  "color": "#4285F4", // Use an appropriate color for {language}
  "description": "A brief description of {language} and this roadmap.",
  "roadmap": [
    {{
      "title": "Section title",
      "description": "Section description",
      "modules": [
        {{
          "name": "Module name",
          "completed": false,
          "description": "Brief description of what will be learned"
        }},
        // More modules...
      ]
    }},
    // More sections...
  ]
}}

Include at least 3 sections (beginner, intermediate, advanced) with 4 modules each.
Make sure to provide appropriate, accurate information for learning {language}.
Each module should have a clear, concise description.
Set all modules as 'completed: false' by default.
Return ONLY the JSON object without any additional text."##
    )
}

fn problems_prompt(topics: &[String]) -> String {
    let topics_text = topics
        .iter()
        .take(MAX_PROBLEM_TOPICS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an expert computer science educator. Generate 4 programming problems based on the following topics from a user's learning roadmap: {topics_text}.

For each problem, create:
1. A clear title that describes the problem
2. A difficulty level (Easy, Medium, or Hard)
3. A specific category (e.g., Algorithms, Data Structures, Mathematics, etc.)
4. A detailed solution approach
5. 2-3 examples with input, output, and explanation

Format the response as a JSON array where each object has the following fields:
- id: number (1, 2, 3, 4)
- title: string (descriptive problem name)
- difficulty: string (Easy, Medium, or Hard)
- solved: boolean (always false)
- category: string (problem category)
- solution: string (detailed solution approach)
- examplesList: array of example objects with:
  - id: number (sequential)
  - input: string (sample input)
  - output: string (expected output)
  - explanation: string (explanation of how the output was derived)

IMPORTANT: Ensure all examples are clear, correct, and properly formatted. The solution should be understandable but challenging appropriate to the difficulty level."#
    )
}

const QUIZ_PROMPT: &str = r#"Create a programming quiz with exactly 5 questions on topics like Python, JavaScript, React, or other programming languages.

IMPORTANT: For each question, your response should follow this EXACT format (example below):

QUESTION: What is the correct way to declare a variable in JavaScript?
OPTION_0: var x = 5;
OPTION_1: variable x = 5;
OPTION_2: v x = 5;
OPTION_3: x := 5;
CORRECT: 0

QUESTION: What does CSS stand for?
OPTION_0: Computer Style Sheets
OPTION_1: Creative Style Sheets
OPTION_2: Cascading Style Sheets
OPTION_3: Colorful Style Sheets
CORRECT: 2

(and so on)

Each question must:
- Be clear and specific to programming concepts
- Have 4 options labeled OPTION_0 through OPTION_3
- Have one correct answer indicated with CORRECT: (0-3)
- Cover different programming concepts (not all the same language)

STRICTLY follow this output format for each question, with NO additional text or explanation."#;

/// Edge cases worth probing for a problem category, by keyword
pub fn edge_case_hints(category: &str) -> Vec<&'static str> {
    let category = category.to_lowercase();
    if category.contains("array") || category.contains("list") {
        vec!["Empty array", "Single element array", "Very large array"]
    } else if category.contains("string") {
        vec![
            "Empty string",
            "Single character string",
            "String with special characters",
        ]
    } else if category.contains("number") || category.contains("math") {
        vec![
            "Zero",
            "Negative numbers",
            "Very large numbers",
            "Decimal numbers",
        ]
    } else {
        Vec::new()
    }
}

pub fn format_examples(examples: &[Example]) -> String {
    examples
        .iter()
        .map(|ex| {
            format!(
                "Example {}:\nInput: {}\nExpected Output: {}\nExplanation: {}",
                ex.id, ex.input, ex.output, ex.explanation
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validation_prompt(problem: &Problem, user_solution: &str) -> String {
    let edge_cases = edge_case_hints(&problem.category).join(", ");
    let examples_text = format_examples(&problem.examples);

    format!(
        r#"You are a strict programming instructor evaluating a student's solution to a coding problem.
You must be critical and thorough in your evaluation.

Carefully review the following:

Problem Title: {title}
Difficulty: {difficulty}
Category: {category}

Problem Description:
{description}

Examples:
{examples_text}

User's Solution:
{user_solution}

IMPORTANT: Be extremely critical and assume the solution is INCORRECT unless you can PROVE it is correct.
The default verdict should be INCORRECT.

Evaluate the user's solution with the following strict criteria:
1. Is the solution syntactically correct for the implied programming language?
2. Does it correctly implement the exact algorithm or approach described in the problem?
3. Does it handle ALL test cases correctly? Trace through each example step by step.
4. Would it handle edge cases such as: {edge_cases}?
5. Is it efficient and optimized as required by the problem difficulty?
6. Does it have any logical errors or bugs?

For each example, trace through the execution of the user's solution with the given input and verify it produces the exact expected output.

Only mark as CORRECT if ALL of the following are true:
- The solution has NO syntax errors
- The solution handles ALL test cases and produces EXACTLY the expected output
- The solution uses the CORRECT approach as specified in the problem
- The solution would handle all reasonable edge cases
- The solution has appropriate time and space complexity for the problem difficulty

Respond with:
1. VERDICT: "CORRECT" only if you have rigorously verified all criteria above are met. Otherwise, "INCORRECT".
2. ANALYSIS: Step-by-step analysis of how the solution performs on each test case.
3. FEEDBACK: Detailed explanation supporting your verdict.
4. SUGGESTIONS: If incorrect, provide hints on how to improve without giving the full solution.

Remember, you must be STRICT and CRITICAL in your evaluation. When in doubt, mark as INCORRECT."#,
        title = problem.title,
        difficulty = problem.difficulty,
        category = problem.category,
        description = problem.solution,
    )
}

fn explanation_prompt(course_title: &str, module_title: &str, subtopic: &str) -> String {
    format!(
        r#"Generate a comprehensive educational explanation about {subtopic} in the context of {course_title},
specifically within the {module_title} module.

Include key concepts, definitions, and important aspects that learners should understand.

The explanation should be structured with an introduction, main points, and a conclusion.
Make it between 300-500 words, educational, and accessible to learners."#
    )
}
