#[cfg(test)]
mod tests {
    use crate::documents::Validator;
    use crate::safety::models::{grade, CreateSafetyTestRequest, Question};
    use serde_json::json;

    fn questions() -> Vec<Question> {
        serde_json::from_value(json!([
            {
                "text": "Скорость на перроне?",
                "answers": [
                    { "text": "20 км/ч", "correct": true },
                    { "text": "60 км/ч" }
                ]
            },
            {
                "text": "Что обязательно при буксировке?",
                "multiple": true,
                "answers": [
                    { "text": "Сигнальный жилет", "correct": true },
                    { "text": "Проблесковый маячок", "correct": true },
                    { "text": "Наушники" }
                ]
            },
            {
                "text": "Кто допускает к работе?",
                "answers": [
                    { "text": "Руководитель работ", "correct": true },
                    { "text": "Водитель" }
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_multiple_choice_needs_exactly_the_correct_set() {
        let qs = questions();
        assert!(qs[1].is_answered_by(&[1, 0]));
        assert!(!qs[1].is_answered_by(&[0]));
        assert!(!qs[1].is_answered_by(&[0, 1, 2]));
    }

    #[test]
    fn test_single_choice_takes_one_answer() {
        let qs = questions();
        assert!(qs[0].is_answered_by(&[0]));
        assert!(!qs[0].is_answered_by(&[1]));
        assert!(!qs[0].is_answered_by(&[0, 1]));
        assert!(!qs[0].is_answered_by(&[7]));
        assert!(!qs[0].is_answered_by(&[]));
    }

    #[test]
    fn test_seventy_percent_passes() {
        let qs = questions();
        let all = grade(&qs, &[vec![0], vec![0, 1], vec![0]]);
        assert_eq!((all.score, all.max_score, all.passed), (3, 3, true));

        // 2 of 3 is below 70%
        let two = grade(&qs, &[vec![0], vec![0, 1]]);
        assert_eq!((two.score, two.passed), (2, false));

        let ten = vec![qs[0].clone(); 10];
        let seven: Vec<Vec<usize>> = (0..10).map(|i| vec![usize::from(i >= 7)]).collect();
        let graded = grade(&ten, &seven);
        assert_eq!((graded.score, graded.passed), (7, true));
    }

    #[test]
    fn test_create_request_checks_each_question() {
        let mut qs = questions();
        qs[0].answers[1].correct = true;
        qs[2].answers[0].correct = false;
        qs[1].text = " ".to_string();
        let request = CreateSafetyTestRequest {
            name: "Охрана труда".to_string(),
            questions: qs,
        };
        let errors = request.validate().unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["questions[0]", "questions[1]", "questions[2]"]);

        let empty = CreateSafetyTestRequest {
            name: String::new(),
            questions: Vec::new(),
        };
        assert_eq!(empty.validate().unwrap_err().len(), 2);
    }
}
