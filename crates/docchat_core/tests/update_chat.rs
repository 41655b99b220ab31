use docchat_core::{update, AppState, Author, ChatMessage, Effect, Msg, RequestError};
use pretty_assertions::assert_eq;

fn init_logging() {
    docchat_logging::initialize_for_tests();
}

fn send(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    update(state, Msg::ChatSubmitted(text.to_string()))
}

#[test]
fn chat_appends_user_message_and_shows_typing() {
    init_logging();
    let (mut state, effects) = send(AppState::new(), "  hello  ");

    assert_eq!(
        effects,
        vec![Effect::SendChat {
            generation: 0,
            chat_id: 1,
            message: "hello".to_string(),
        }]
    );
    let view = state.view();
    assert!(view.typing);
    assert_eq!(view.chat.last(), Some(&ChatMessage::user("hello")));
    assert!(state.consume_dirty());
}

#[test]
fn empty_chat_message_is_ignored() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = send(state.clone(), "   ");

    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn reply_replaces_typing_indicator() {
    init_logging();
    let (state, _) = send(AppState::new(), "what is in the report?");
    let (state, _) = update(
        state,
        Msg::ChatReplied {
            generation: 0,
            chat_id: 1,
            result: Ok("It covers Q3 revenue.".to_string()),
        },
    );

    let view = state.view();
    assert!(!view.typing);
    assert_eq!(
        view.chat.last(),
        Some(&ChatMessage::assistant("It covers Q3 revenue."))
    );
}

#[test]
fn backend_error_is_shown_inline() {
    init_logging();
    let (state, _) = send(AppState::new(), "hello");
    let (mut state, _) = update(
        state,
        Msg::ChatReplied {
            generation: 0,
            chat_id: 1,
            result: Err(RequestError::Backend("no documents loaded".to_string())),
        },
    );

    let last = state.chat().last().unwrap();
    assert_eq!(last.author, Author::Assistant);
    assert_eq!(last.text, "Sorry, I encountered an error: no documents loaded");
    assert!(state.drain_notices().is_empty());
}

#[test]
fn network_error_uses_generic_message() {
    init_logging();
    let (state, _) = send(AppState::new(), "hello");
    let (state, _) = update(
        state,
        Msg::ChatReplied {
            generation: 0,
            chat_id: 1,
            result: Err(RequestError::Network("connection refused".to_string())),
        },
    );

    assert_eq!(
        state.chat().last().unwrap().text,
        "Sorry, I encountered an error processing your request."
    );
}

#[test]
fn typing_stays_until_every_reply_arrived() {
    init_logging();
    let (state, _) = send(AppState::new(), "one");
    let (state, _) = send(state, "two");
    let (state, _) = update(
        state,
        Msg::ChatReplied {
            generation: 0,
            chat_id: 2,
            result: Ok("second".to_string()),
        },
    );
    assert!(state.view().typing);

    let (state, _) = update(
        state,
        Msg::ChatReplied {
            generation: 0,
            chat_id: 1,
            result: Ok("first".to_string()),
        },
    );
    assert!(!state.view().typing);
    let texts: Vec<_> = state.chat().iter().skip(1).map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two", "second", "first"]);
}

#[test]
fn duplicate_reply_is_ignored() {
    init_logging();
    let (state, _) = send(AppState::new(), "hello");
    let reply = Msg::ChatReplied {
        generation: 0,
        chat_id: 1,
        result: Ok("hi".to_string()),
    };
    let (state, _) = update(state, reply.clone());
    let (state, _) = update(state, reply);

    assert_eq!(state.chat().len(), 3);
}
