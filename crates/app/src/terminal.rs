//! Line-oriented terminal front end.

use std::io::{BufRead, Write};
use std::thread;

use services::{
    AnswerState, FeedbackCue, FeedbackSink, QuestionPicker, ResultView, RunningSession,
    SessionAction, SessionView, TickOutcome, Transition,
};
use tokio::sync::mpsc;

/// Rings the terminal bell for wrong answers and failed runs.
pub struct TerminalFeedback;

impl FeedbackSink for TerminalFeedback {
    fn cue(&self, cue: FeedbackCue) {
        tracing::debug!(?cue, "feedback");
        if matches!(cue, FeedbackCue::Wrong | FeedbackCue::Failed) {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }
}

/// `MM:SS`, minutes unbounded.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Action(SessionAction),
    Choose(usize),
    List(String),
    Go(String),
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    match head {
        "n" | "next" => Input::Action(SessionAction::Advance),
        "p" | "prev" => Input::Action(SessionAction::Back),
        "t" | "translate" => Input::Action(SessionAction::ToggleTranslation),
        "f" | "finish" => Input::Action(SessionAction::Finish),
        "l" | "list" => Input::List(rest.trim().to_owned()),
        "g" | "go" => Input::Go(rest.trim().to_owned()),
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" => Input::Quit,
        other => match other.parse::<usize>() {
            Ok(choice) if choice > 0 => Input::Choose(choice),
            _ => Input::Unknown(line.to_owned()),
        },
    }
}

fn print_help() {
    println!("  1-9     choose an answer");
    println!("  n       next question");
    println!("  p       previous question (practice)");
    println!("  l 12    list questions whose number contains 12 (practice)");
    println!("  g 12    go to the first match (practice)");
    println!("  t       toggle translation");
    println!("  f       finish now");
    println!("  q       quit without a result");
}

fn render(view: &SessionView) {
    println!();
    let mut header = format!(
        "Question {}/{}  [#{}]  answered: {}  correct: {}",
        view.position + 1,
        view.total,
        view.question_id,
        view.answered,
        view.correct
    );
    if let Some(remaining) = view.remaining_secs {
        header.push_str(&format!("  time: {}", format_clock(remaining)));
    }
    println!("{header}");
    println!("{}", view.prompt);
    if let Some(image) = &view.image {
        println!("  (image: {image})");
    }
    for (number, answer) in view.answers.iter().enumerate() {
        let marker = match answer.state {
            AnswerState::Unselected | AnswerState::Other { correct: false } => " ",
            AnswerState::SelectedCorrect | AnswerState::Other { correct: true } => "+",
            AnswerState::SelectedIncorrect => "x",
        };
        println!("  {marker} {}) {}", number + 1, answer.text);
    }
}

pub fn print_result(result: &ResultView) {
    println!();
    println!(
        "{}: {} of {} correct in {}",
        result.title,
        result.correct,
        result.total,
        format_clock(result.elapsed_secs)
    );
    println!("{}", if result.passed { "Passed." } else { "Not passed." });
}

fn low_time_notice(remaining_secs: u32) -> String {
    format!("Time is running low: {} left.", format_clock(remaining_secs))
}

/// Read stdin lines on their own thread.
///
/// A blocking read cannot be cancelled, so it must not live on the runtime:
/// when the session ends the thread is simply left behind and dies with the
/// process. The channel closes at end of input.
pub fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Why `run_session` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Finished,
    Abandoned,
    InputClosed,
}

fn handle(running: &mut RunningSession, picker: &mut QuestionPicker, input: Input) -> bool {
    let transition = match input {
        Input::Action(action) => running.apply(action),
        Input::Choose(choice) => {
            let Some(answer_id) = running
                .view()
                .and_then(|view| view.answers.get(choice - 1).map(|a| a.id.clone()))
            else {
                println!("no answer {choice}");
                return true;
            };
            running.apply(SessionAction::Select(answer_id))
        }
        Input::List(query) => {
            picker.set_query(&query);
            let session = running.session();
            for entry in picker.matches(session.working_set(), session.index()) {
                let marker = if entry.is_current { "*" } else { " " };
                println!(" {marker} question {}", entry.question_id);
            }
            return true;
        }
        Input::Go(query) => {
            picker.set_query(&query);
            let session = running.session();
            let Some(entry) = picker
                .matches(session.working_set(), session.index())
                .into_iter()
                .next()
            else {
                println!("no question matches {query}");
                return true;
            };
            running.apply(SessionAction::JumpTo(entry.index))
        }
        Input::Help => {
            print_help();
            return true;
        }
        Input::Quit => return false,
        Input::Unknown(line) => {
            println!("unknown command: {line} (h for help)");
            return true;
        }
    };

    match transition {
        Transition::Ignored => println!("not possible right now"),
        Transition::Finished(_) => {}
        Transition::Answered { .. } | Transition::Moved { .. } | Transition::TranslationToggled { .. } => {
            if let Some(view) = running.view() {
                render(&view);
            }
        }
    }
    true
}

/// Drive `running` from input lines and countdown ticks until it finishes,
/// the user quits or input closes.
pub async fn run_session(
    running: &mut RunningSession,
    inputs: &mut mpsc::UnboundedReceiver<String>,
) -> SessionEnd {
    let mut picker = QuestionPicker::new();
    let mut warned = false;

    println!("{} (h for help)", running.session().mode().title());
    if let Some(view) = running.view() {
        render(&view);
    }

    while !running.is_finished() {
        tokio::select! {
            biased;
            outcome = running.next_tick() => match outcome {
                TickOutcome::Ticked { remaining_secs, low_time } if low_time && !warned => {
                    warned = true;
                    println!("{}", low_time_notice(remaining_secs));
                }
                TickOutcome::Expired(_) => println!("Time is up."),
                _ => {}
            },
            line = inputs.recv() => match line {
                Some(line) => {
                    if !handle(running, &mut picker, parse_input(&line)) {
                        tracing::info!("session abandoned");
                        return SessionEnd::Abandoned;
                    }
                }
                None => return SessionEnd::InputClosed,
            },
        }
    }
    SessionEnd::Finished
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Clock;
    use quiz_core::model::{
        Answer, AnswerId, ExamMode, ExamSettingsDraft, Question, QuestionDraft, Translations,
    };
    use services::{ExamSession, WorkingSet};

    fn question(id: &str) -> Question {
        QuestionDraft {
            id: id.to_owned(),
            original: format!("Frage {id}"),
            answers: vec![
                Answer::new(AnswerId::new("a"), "Ja", Translations::new()),
                Answer::new(AnswerId::new("b"), "Nein", Translations::new()),
            ],
            correct_answer_id: "a".into(),
            ..QuestionDraft::default()
        }
        .validate()
        .unwrap()
    }

    fn timed(duration_secs: u32) -> RunningSession {
        let settings = ExamSettingsDraft {
            test_duration_secs: duration_secs,
            warning_threshold_secs: 5,
            ..ExamSettingsDraft::default()
        }
        .validate()
        .unwrap();
        let set = WorkingSet::new(ExamMode::Test { count: 2 }, vec![question("1"), question("2")]);
        RunningSession::new(ExamSession::new(set, &settings, Clock::default()).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_ends_the_loop_while_input_stays_open() {
        let (_tx, mut rx) = mpsc::unbounded_channel();
        let mut running = timed(2);

        let end = run_session(&mut running, &mut rx).await;

        assert_eq!(end, SessionEnd::Finished);
        let result = running.session().result().unwrap();
        assert_eq!(result.elapsed_secs(), 2);
        assert_eq!(result.total(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_and_closed_input_end_the_loop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut running = timed(60);
        tx.send("1".to_owned()).unwrap();
        tx.send("q".to_owned()).unwrap();
        assert_eq!(run_session(&mut running, &mut rx).await, SessionEnd::Abandoned);
        assert_eq!(running.session().correct_count(), 1);

        drop(tx);
        let mut running = timed(60);
        assert_eq!(run_session(&mut running, &mut rx).await, SessionEnd::InputClosed);
    }

    #[test]
    fn low_time_notice_shows_remaining_time() {
        assert_eq!(low_time_notice(299), "Time is running low: 04:59 left.");
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(1_799), "29:59");
        assert_eq!(format_clock(5_400), "90:00");
    }

    #[test]
    fn inputs_are_parsed() {
        assert_eq!(parse_input("2"), Input::Choose(2));
        assert_eq!(parse_input(" n "), Input::Action(SessionAction::Advance));
        assert_eq!(parse_input("g 17"), Input::Go("17".into()));
        assert_eq!(parse_input("l"), Input::List(String::new()));
        assert_eq!(parse_input("0"), Input::Unknown("0".into()));
        assert_eq!(parse_input("zz"), Input::Unknown("zz".into()));
    }
}
