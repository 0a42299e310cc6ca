use quiz_core::model::{Answer, AnswerId, Question, QuestionDraft, Translations};

fn answer(id: &str) -> Answer {
    let mut translations = Translations::new();
    translations.insert("en".into(), format!("answer {id}"));
    Answer::new(AnswerId::new(id), format!("Antwort {id}"), translations)
}

/// Question `id` with answers `correct`, `X` and `Y`.
pub(crate) fn build_question(id: &str, correct: &str) -> Question {
    let mut translations = Translations::new();
    translations.insert("en".into(), format!("question {id}"));
    QuestionDraft {
        id: id.to_owned(),
        original: format!("Frage {id}"),
        translations,
        image: None,
        answers: vec![answer(correct), answer("X"), answer("Y")],
        correct_answer_id: correct.to_owned(),
    }
    .validate()
    .unwrap()
}

/// Questions `1..=n`, each with answers `a` to `d` and `a` correct.
pub(crate) fn build_questions(n: usize) -> Vec<Question> {
    (1..=n)
        .map(|i| {
            QuestionDraft {
                id: i.to_string(),
                original: format!("Frage {i}"),
                translations: Translations::new(),
                image: None,
                answers: ["a", "b", "c", "d"].into_iter().map(answer).collect(),
                correct_answer_id: "a".into(),
            }
            .validate()
            .unwrap()
        })
        .collect()
}
