//! Tool-facing host: session lookup, actor-to-color mapping and the game
//! session check, on top of a [`SessionStore`].
//!
//! Transport, text generation and board rendering stay with the caller;
//! every operation returns the structured [`ToolReply`] they build on.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::GameError;
use crate::game::Controller;
use crate::session::{Session, SessionId, SessionStore};
use crate::types::{Color, ExportState, PlayResult};

/// The two remote actors and the color each may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    /// The human side, plays Black.
    User,
    /// The model side, plays White.
    Assistant,
}

impl Actor {
    pub fn color(self) -> Color {
        match self {
            Self::User => Color::Black,
            Self::Assistant => Color::White,
        }
    }
}

/// Structured payload of one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReply {
    pub result: PlayResult,
    pub state: ExportState,
    pub session_id: SessionId,
    pub game_session: SessionId,
}

impl ToolReply {
    pub(crate) fn of(session: &Session, result: PlayResult) -> Self {
        Self {
            result,
            state: session.snapshot().clone(),
            session_id: session.id().clone(),
            game_session: session.game_session().clone(),
        }
    }
}

/// Runs controller calls against stored sessions.
#[derive(Debug)]
pub struct GameHost<S> {
    controller: Controller,
    store: S,
}

impl<S: SessionStore> GameHost<S> {
    pub fn new(controller: Controller, store: S) -> Self {
        Self { controller, store }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Starts a game under `id`. An existing game there is restarted in
    /// place: same token, opening position, sequence + 1.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn new_game(&self, id: &SessionId) -> ToolReply {
        let restarted = self.store.update(id, |session| {
            let result = self.controller.restart(session);
            ToolReply::of(session, result)
        });
        if let Some(reply) = restarted {
            return reply;
        }

        let session = Session::new(id.clone());
        info!(game_session = %session.game_session(), "new game");
        let reply = ToolReply::of(
            &session,
            PlayResult {
                reset: Some(true),
                ..PlayResult::accepted()
            },
        );
        self.store.insert(session);
        reply
    }

    /// Current snapshot of a stored game.
    pub fn board(&self, id: &SessionId) -> Result<ExportState, GameError> {
        self.store
            .get(id)
            .map(|session| session.snapshot().clone())
            .ok_or_else(|| unknown(id))
    }

    /// Black's move. `game_session` is the token the user's client believes
    /// it is playing in and must match the stored game's token.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn select_user(
        &self,
        id: &SessionId,
        mv: &str,
        game_session: Option<&str>,
        claimed_sequence: Option<u64>,
    ) -> Result<ToolReply, GameError> {
        self.store
            .update(id, |session| {
                if game_session != Some(session.game_session().as_str()) {
                    warn!(claimed = ?game_session, "game session mismatch");
                    return ToolReply::of(
                        session,
                        PlayResult::rejected(&GameError::SessionMismatch),
                    );
                }
                let result = self
                    .controller
                    .play(session, Actor::User.color(), claimed_sequence, mv);
                ToolReply::of(session, result)
            })
            .ok_or_else(|| unknown(id))
    }

    /// White's move.
    pub fn select_assistant(
        &self,
        id: &SessionId,
        mv: &str,
        claimed_sequence: Option<u64>,
    ) -> Result<ToolReply, GameError> {
        self.play_as(Actor::Assistant, id, mv, claimed_sequence)
    }

    /// Plays `mv` for the color `actor` is allowed to move, without a token
    /// check.
    pub fn play_as(
        &self,
        actor: Actor,
        id: &SessionId,
        mv: &str,
        claimed_sequence: Option<u64>,
    ) -> Result<ToolReply, GameError> {
        self.store
            .update(id, |session| {
                let result = self
                    .controller
                    .play(session, actor.color(), claimed_sequence, mv);
                ToolReply::of(session, result)
            })
            .ok_or_else(|| unknown(id))
    }

    /// Replaces the stored game with a saved snapshot. When accepted, a
    /// supplied `game_session` becomes the game's token, so a client
    /// reconnecting with state from an earlier conversation keeps its token.
    #[instrument(skip(self, snapshot), fields(session_id = %id))]
    pub fn restore_game(
        &self,
        id: &SessionId,
        snapshot: ExportState,
        game_session: Option<&str>,
        claimed_sequence: Option<u64>,
    ) -> Result<ToolReply, GameError> {
        self.store
            .update(id, |session| {
                let result = match self.controller.restore(session, snapshot, claimed_sequence) {
                    Ok(_) => {
                        if let Some(token) = game_session {
                            session.set_game_session(token.into());
                        }
                        PlayResult::accepted()
                    }
                    Err(err) => PlayResult::rejected(&err),
                };
                ToolReply::of(session, result)
            })
            .ok_or_else(|| unknown(id))
    }

    /// Drops a game from the store and returns its last snapshot.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn end_game(&self, id: &SessionId) -> Result<ExportState, GameError> {
        let session = self.store.remove(id).ok_or_else(|| unknown(id))?;
        info!(sequence = session.sequence(), "game ended");
        Ok(session.snapshot().clone())
    }
}

fn unknown(id: &SessionId) -> GameError {
    GameError::UnknownSession(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;
    use crate::session::MemoryStore;

    fn host() -> GameHost<MemoryStore> {
        GameHost::new(Controller::default(), MemoryStore::new())
    }

    fn started(host: &GameHost<MemoryStore>) -> (SessionId, SessionId) {
        let reply = host.new_game(&"chat-1".into());
        (reply.session_id, reply.game_session)
    }

    #[test]
    fn new_game_stores_the_opening() {
        let host = host();

        let reply = host.new_game(&"chat-1".into());

        assert_eq!(reply.result.reset, Some(true));
        assert_eq!(reply.state, rules::init());
        assert_eq!(reply.session_id.as_str(), "chat-1");
        assert_ne!(reply.game_session, reply.session_id);
        assert_eq!(host.board(&reply.session_id).unwrap(), rules::init());
        assert_eq!(host.store().len(), 1);
    }

    #[test]
    fn new_game_on_a_live_session_restarts_it_in_place() {
        let host = host();
        let (id, token) = started(&host);
        host.select_user(&id, "D3", Some(token.as_str()), Some(0)).unwrap();

        let reply = host.new_game(&id);

        assert!(reply.result.ok);
        assert_eq!(reply.result.reset, Some(true));
        assert_eq!(reply.state.board, rules::init().board);
        assert_eq!(reply.state.sequence, 2);
        assert_eq!(reply.game_session, token);
        assert_eq!(host.store().len(), 1);
        assert_eq!(host.board(&id).unwrap().sequence, 2);
    }

    #[test]
    fn user_and_assistant_alternate() {
        let host = host();
        let (id, token) = started(&host);

        let reply = host
            .select_user(&id, "D3", Some(token.as_str()), Some(0))
            .unwrap();
        assert!(reply.result.ok);
        assert_eq!(reply.state.side_to_move, Color::White);

        let reply = host.select_assistant(&id, "C3", Some(1)).unwrap();
        assert!(reply.result.ok);
        assert_eq!(reply.state.side_to_move, Color::Black);
        assert_eq!(host.board(&id).unwrap().sequence, 2);
    }

    #[test]
    fn assistant_cannot_move_for_the_user() {
        let host = host();
        let (id, _) = started(&host);

        let reply = host.select_assistant(&id, "D3", None).unwrap();

        assert_eq!(reply.result.code.as_deref(), Some("WRONG_TURN"));
        assert_eq!(reply.state, rules::init());
    }

    #[test]
    fn user_with_a_foreign_session_token_is_rejected() {
        let host = host();
        let (id, _) = started(&host);

        let reply = host.select_user(&id, "D3", Some("other"), None).unwrap();
        assert_eq!(reply.result.code.as_deref(), Some("SESSION_MISMATCH"));

        let reply = host.select_user(&id, "D3", None, None).unwrap();
        assert_eq!(reply.result.code.as_deref(), Some("SESSION_MISMATCH"));

        // the store key is not the token
        let reply = host.select_user(&id, "D3", Some(id.as_str()), None).unwrap();
        assert_eq!(reply.result.code.as_deref(), Some("SESSION_MISMATCH"));
        assert_eq!(host.board(&id).unwrap().sequence, 0);
    }

    #[test]
    fn unknown_session_is_an_error() {
        let host = host();
        let id = SessionId::from("missing");

        assert_eq!(
            host.select_assistant(&id, "D3", None),
            Err(GameError::UnknownSession("missing".into()))
        );
        assert!(host.select_user(&id, "D3", Some("t"), None).is_err());
        assert!(host.board(&id).is_err());
        assert!(host.end_game(&id).is_err());
    }

    #[test]
    fn restore_game_replaces_the_stored_snapshot() {
        let host = host();
        let (id, token) = started(&host);
        let saved = Controller::default()
            .step(&rules::init(), Color::Black, None, "E6")
            .unwrap()
            .snapshot;

        let reply = host.restore_game(&id, saved.clone(), None, Some(0)).unwrap();

        assert!(reply.result.ok);
        assert_eq!(reply.state.board, saved.board);
        assert_eq!(reply.state.side_to_move, Color::White);
        assert_eq!(reply.state.sequence, 1);
        assert_eq!(reply.game_session, token);
    }

    #[test]
    fn restore_game_adopts_the_supplied_token() {
        let host = host();
        let (id, _) = started(&host);

        let reply = host
            .restore_game(&id, rules::init(), Some("earlier-game"), None)
            .unwrap();
        assert_eq!(reply.game_session.as_str(), "earlier-game");

        let reply = host
            .select_user(&id, "C4", Some("earlier-game"), Some(1))
            .unwrap();
        assert!(reply.result.ok);
    }

    #[test]
    fn restore_game_reports_invalid_payloads() {
        let host = host();
        let (id, token) = started(&host);
        let mut saved = rules::init();
        saved.legal_moves.clear();

        let reply = host.restore_game(&id, saved, Some("other"), None).unwrap();

        assert_eq!(reply.result.code.as_deref(), Some("INVALID_STATE"));
        assert_eq!(reply.state, rules::init());
        assert_eq!(reply.game_session, token);
    }

    #[test]
    fn end_game_removes_the_session() {
        let host = host();
        let (id, token) = started(&host);
        host.select_user(&id, "F5", Some(token.as_str()), None).unwrap();

        let last = host.end_game(&id).unwrap();

        assert_eq!(last.sequence, 1);
        assert!(host.store().is_empty());
        assert!(host.board(&id).is_err());
        assert_eq!(host.new_game(&id).state, rules::init());
    }

    #[test]
    fn reply_serializes_with_camel_case_keys() {
        let reply = host().new_game(&"chat-1".into());

        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["result"]["ok"], true);
        assert_eq!(json["state"]["to"], "B");
        assert_eq!(json["sessionId"], "chat-1");
        assert!(json["gameSession"].is_string());
    }
}
