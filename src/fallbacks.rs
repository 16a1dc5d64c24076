//! Fixed default payloads used when a model response cannot be normalized.

use crate::models::{
    Difficulty, Example, Module, ProblemDraft, QuizQuestion, RoadmapPlan, Section, total_modules,
};
use crate::response_parser::{DEFAULT_ROADMAP_COLOR, DEFAULT_ROADMAP_ICON};

/// Brand color for well-known languages, matched case-insensitively
pub fn language_color(language: &str) -> &'static str {
    match language.to_lowercase().as_str() {
        "javascript" => "#F7DF1E",
        "python" => "#3776AB",
        "java" => "#007396",
        "c#" => "#68217A",
        "c++" => "#00599C",
        "php" => "#777BB4",
        "ruby" => "#CC342D",
        "swift" => "#FA7343",
        "go" => "#00ADD8",
        "rust" => "#DEA584",
        _ => DEFAULT_ROADMAP_COLOR,
    }
}

fn module(name: &str, description: impl Into<String>) -> Module {
    Module {
        name: name.to_string(),
        completed: false,
        description: description.into(),
    }
}

/// Three sections of four modules each, parameterized by language name only
pub fn fallback_roadmap(language: &str) -> RoadmapPlan {
    let sections = vec![
        Section {
            title: format!("{} Basics", language),
            description: format!("Build a solid foundation with core {} concepts", language),
            modules: vec![
                module(
                    "Setup & Installation",
                    format!("Setup your development environment for {}", language),
                ),
                module(
                    "Syntax & Basic Constructs",
                    "Learn the basic syntax and programming constructs",
                ),
                module(
                    "Variables & Data Types",
                    "Understanding data types and variable declaration",
                ),
                module("Functions", "Create reusable code blocks"),
            ],
        },
        Section {
            title: format!("Intermediate {}", language),
            description: "Expand your skills with more complex features".to_string(),
            modules: vec![
                module(
                    "Data Structures",
                    "Working with arrays, lists, and complex data structures",
                ),
                module("Error Handling", "Handle and manage errors in your code"),
                module("File I/O", "Reading from and writing to files"),
                module("Package Management", "Using libraries and dependencies"),
            ],
        },
        Section {
            title: format!("Advanced {}", language),
            description: "Master professional development techniques".to_string(),
            modules: vec![
                module("Design Patterns", "Implementing common design patterns"),
                module("Testing", "Writing tests and ensuring code quality"),
                module(
                    "Performance Optimization",
                    "Making your code faster and more efficient",
                ),
                module(
                    "Advanced Topics",
                    format!("Specialized {} features and frameworks", language),
                ),
            ],
        },
    ];

    RoadmapPlan {
        name: format!("{} Fundamentals", language),
        icon: DEFAULT_ROADMAP_ICON.to_string(),
        color: language_color(language).to_string(),
        description: format!("Learn the fundamentals of {} programming language.", language),
        lesson_count: total_modules(&sections),
        sections,
    }
}

fn example(id: u32, input: &str, output: &str, explanation: &str) -> Example {
    Example {
        id,
        input: input.to_string(),
        output: output.to_string(),
        explanation: explanation.to_string(),
    }
}

pub fn fallback_problems() -> Vec<ProblemDraft> {
    vec![
        ProblemDraft {
            title: "String Reversal Algorithm".to_string(),
            difficulty: Difficulty::Easy,
            category: "Strings".to_string(),
            solution: "Iterate from the end of the string to the beginning, appending each character to a new string.".to_string(),
            examples: vec![
                example(1, "hello", "olleh", "Reversed all characters from the input string."),
                example(2, "world", "dlrow", "Reversed all characters from the input string."),
            ],
        },
        ProblemDraft {
            title: "Finding Maximum Value".to_string(),
            difficulty: Difficulty::Easy,
            category: "Arrays".to_string(),
            solution: "Initialize a variable with the first element and iterate through the array, updating the variable if a larger value is found.".to_string(),
            examples: vec![
                example(1, "[3, 7, 2, 9, 1]", "9", "9 is the largest value in the array."),
                example(2, "[-5, -2, -8, -1]", "-1", "-1 is the largest value in the array."),
            ],
        },
        ProblemDraft {
            title: "Check for Palindrome".to_string(),
            difficulty: Difficulty::Medium,
            category: "Strings".to_string(),
            solution: "Compare characters from both ends moving inward. If any pair doesn't match, it's not a palindrome.".to_string(),
            examples: vec![
                example(1, "radar", "true", "Reading from left to right or right to left results in the same word."),
                example(2, "hello", "false", "Reading from right to left gives 'olleh', which is different from 'hello'."),
            ],
        },
        ProblemDraft {
            title: "Binary Search Implementation".to_string(),
            difficulty: Difficulty::Medium,
            category: "Algorithms".to_string(),
            solution: "Compare the target value to the middle element of the array. If they are not equal, narrow the search to the left or right half based on whether the target is less than or greater than the middle element.".to_string(),
            examples: vec![
                example(1, "nums = [1, 3, 5, 7, 9], target = 5", "2", "The value 5 is found at index 2."),
                example(2, "nums = [1, 3, 5, 7, 9], target = 4", "-1", "The value 4 is not in the array, so return -1."),
            ],
        },
    ]
}

fn question(text: &str, options: [&str; 4], correct_answer: i32) -> QuizQuestion {
    QuizQuestion {
        question: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
    }
}

pub fn fallback_quiz() -> Vec<QuizQuestion> {
    vec![
        question(
            "Which of the following is NOT a valid way to declare a variable in JavaScript?",
            ["let x = 10;", "const x = 10;", "var x = 10;", "int x = 10;"],
            3,
        ),
        question(
            "What is the output of print(type([]) is list) in Python?",
            ["True", "False", "TypeError", "None"],
            0,
        ),
        question(
            "Which React hook is used to perform side effects in a functional component?",
            ["useState", "useEffect", "useContext", "useReducer"],
            1,
        ),
        question(
            "What does CSS stand for?",
            [
                "Computer Style Sheets",
                "Creative Style Sheets",
                "Cascading Style Sheets",
                "Colorful Style Sheets",
            ],
            2,
        ),
        question(
            "Which data structure follows the Last-In-First-Out (LIFO) principle?",
            ["Queue", "Stack", "Linked List", "Tree"],
            1,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fallback_roadmap_shape() {
        let plan = fallback_roadmap("Rust");

        assert_eq!(plan.name, "Rust Fundamentals");
        assert_eq!(plan.color, "#DEA584");
        assert_eq!(plan.sections.len(), 3);
        assert!(plan.sections.iter().all(|s| s.modules.len() == 4));
        assert_eq!(plan.lesson_count, 12);
        assert_eq!(plan.sections[2].title, "Advanced Rust");
        assert!(
            plan.sections
                .iter()
                .flat_map(|s| &s.modules)
                .all(|m| !m.completed)
        );
    }

    #[test]
    fn test_language_colors() {
        assert_eq!(language_color("JavaScript"), "#F7DF1E");
        assert_eq!(language_color("c#"), "#68217A");
        assert_eq!(language_color("GO"), "#00ADD8");
        assert_eq!(language_color("Kotlin"), DEFAULT_ROADMAP_COLOR);
    }

    #[test]
    fn test_fallbacks_are_deterministic() {
        assert_eq!(fallback_roadmap("Python"), fallback_roadmap("Python"));
        assert_eq!(fallback_problems(), fallback_problems());
        assert_eq!(fallback_quiz(), fallback_quiz());
    }

    #[test]
    fn test_fallback_problems_are_well_formed() {
        let problems = fallback_problems();
        assert_eq!(problems.len(), 4);

        for problem in &problems {
            assert!(!problem.examples.is_empty());
            let ids: HashSet<u32> = problem.examples.iter().map(|e| e.id).collect();
            assert_eq!(ids.len(), problem.examples.len(), "{}", problem.title);
        }
    }

    #[test]
    fn test_fallback_quiz_answers_reference_options() {
        let quiz = fallback_quiz();
        assert_eq!(quiz.len(), 5);

        for question in &quiz {
            assert_eq!(question.options.len(), 4);
            assert!((0..4).contains(&question.correct_answer));
        }
    }
}
