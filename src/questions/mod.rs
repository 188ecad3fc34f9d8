//! Question catalog: base wizard questions, product categories and project goals.
//!
//! The catalog is static. Goal and category metadata drive which deploy
//! instructions, tests and documentation the downstream prompts ask for.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    WebApp,
    Bot,
    MobileApp,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::WebApp, Category::Bot, Category::MobileApp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WebApp => "WEB_APP",
            Category::Bot => "BOT",
            Category::MobileApp => "MOBILE_APP",
        }
    }

    /// Russian display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::WebApp => "Web приложение",
            Category::Bot => "Telegram бот",
            Category::MobileApp => "Мобильное приложение",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::WebApp => "🌐",
            Category::Bot => "🤖",
            Category::MobileApp => "📱",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// Emoji for a possibly unknown category
pub fn category_emoji(category: Option<Category>) -> &'static str {
    category.map(|c| c.emoji()).unwrap_or("📦")
}

/// What the user wants to achieve with the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectGoal {
    #[serde(rename = "Обучение и практика")]
    Learning,
    #[serde(rename = "Использовать самому")]
    Personal,
    #[serde(rename = "Для пользователей")]
    Users,
    #[serde(rename = "Портфолио")]
    Portfolio,
}

impl ProjectGoal {
    pub const ALL: [ProjectGoal; 4] = [
        ProjectGoal::Learning,
        ProjectGoal::Personal,
        ProjectGoal::Users,
        ProjectGoal::Portfolio,
    ];

    /// Value as presented to users and templates
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectGoal::Learning => "Обучение и практика",
            ProjectGoal::Personal => "Использовать самому",
            ProjectGoal::Users => "Для пользователей",
            ProjectGoal::Portfolio => "Портфолио",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProjectGoal::Learning => "Простой код, без тестов, локальный запуск",
            ProjectGoal::Personal => "Рабочий код, опциональные тесты",
            ProjectGoal::Users => "Production-ready, тесты обязательны, облачный деплой",
            ProjectGoal::Portfolio => "Идеальный код, полное покрытие тестами, красивый деплой",
        }
    }

    pub fn deploy_target(&self) -> DeployTarget {
        match self {
            ProjectGoal::Learning => DeployTarget::Local,
            ProjectGoal::Personal => DeployTarget::Docker,
            ProjectGoal::Users | ProjectGoal::Portfolio => DeployTarget::Vercel,
        }
    }

    pub fn tests_required(&self) -> bool {
        matches!(self, ProjectGoal::Users | ProjectGoal::Portfolio)
    }

    pub fn documentation_required(&self) -> bool {
        matches!(self, ProjectGoal::Portfolio)
    }
}

impl fmt::Display for ProjectGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectGoal {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectGoal::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// Recommended deployment for a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployTarget {
    Local,
    Docker,
    Vercel,
}

impl DeployTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployTarget::Local => "local",
            DeployTarget::Docker => "docker",
            DeployTarget::Vercel => "vercel",
        }
    }
}

/// A string outside a fixed enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownValue(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Select,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionOption {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// A question asked of every user regardless of category
#[derive(Debug, Clone, Serialize)]
pub struct BaseQuestion {
    pub id: &'static str,
    pub question: &'static str,
    pub explanation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
}

/// Minimum trimmed length of text answers
const MIN_TEXT_ANSWER_CHARS: usize = 3;

lazy_static! {
    static ref BASE_QUESTIONS: Vec<BaseQuestion> = vec![
        BaseQuestion {
            id: "audience",
            question: "Для кого этот продукт?",
            explanation: "Понимание аудитории определит UI/UX, сложность интерфейса и терминологию в коде.",
            placeholder: Some("Например: для студентов, для себя, для малого бизнеса..."),
            kind: QuestionKind::Text,
            required: true,
            options: vec![],
        },
        BaseQuestion {
            id: "problem",
            question: "Какую конкретную проблему он решает?",
            explanation: "Это ядро PRD. Помогает определить главные функции и отсечь лишнее в MVP.",
            placeholder: Some("Опишите проблему или задачу..."),
            kind: QuestionKind::Text,
            required: true,
            options: vec![],
        },
        BaseQuestion {
            id: "result",
            question: "Какой главный результат получит пользователь?",
            explanation: "Определяет критерий успеха продукта и помогает приоритизировать фичи.",
            placeholder: Some("Что изменится для пользователя после использования?"),
            kind: QuestionKind::Text,
            required: true,
            options: vec![],
        },
        BaseQuestion {
            id: "goal",
            question: "Какую цель вы преследуете этим проектом?",
            explanation: "Влияет на уровень качества кода, нужны ли тесты, документация и production-деплой.",
            placeholder: None,
            kind: QuestionKind::Select,
            required: true,
            options: ProjectGoal::ALL
                .iter()
                .map(|goal| QuestionOption {
                    value: goal.as_str(),
                    label: goal.as_str(),
                    description: goal.description(),
                })
                .collect(),
        },
    ];
}

/// The four base questions, in wizard order
pub fn base_questions() -> &'static [BaseQuestion] {
    &BASE_QUESTIONS
}

/// A problem with one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Outcome of answer validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerValidation {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// Check answers to the base questions.
///
/// A question may report more than one error. Non-string answers are
/// checked through their JSON text.
pub fn validate_base_answers(answers: &Map<String, Value>) -> AnswerValidation {
    let mut errors = Vec::new();

    for question in base_questions() {
        let answer = answers.get(question.id).and_then(answer_text);

        let Some(answer) = answer else {
            if question.required {
                errors.push(FieldError {
                    field: question.id.to_string(),
                    message: format!(
                        "Поле \"{}\" обязательно для заполнения",
                        question.question
                    ),
                });
            }
            continue;
        };

        match question.kind {
            QuestionKind::Text => {
                if answer.trim().chars().count() < MIN_TEXT_ANSWER_CHARS {
                    errors.push(FieldError {
                        field: question.id.to_string(),
                        message: format!(
                            "Поле \"{}\" слишком короткое (минимум 3 символа)",
                            question.question
                        ),
                    });
                }
            }
            QuestionKind::Select => {
                if !question.options.iter().any(|o| o.value == answer) {
                    errors.push(FieldError {
                        field: question.id.to_string(),
                        message: format!("Некорректное значение для \"{}\"", question.question),
                    });
                }
            }
        }
    }

    AnswerValidation {
        valid: errors.is_empty(),
        errors,
    }
}

/// Text of an answer; absent, null, false, zero and empty answers count as missing
fn answer_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
