//! JavaScript bindings for tool servers running on a JS runtime.

use wasm_bindgen::prelude::*;

use crate::config::ControllerConfig;
use crate::error::GameError;
use crate::game::Controller;
use crate::host::ToolReply;
use crate::session::Session;
use crate::types::{Color, ExportState, PlayResult};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// One game session owned by the JS side.
///
/// Every method returns a plain object
/// `{ result, state, sessionId, gameSession }`;
/// rejected moves come back as `result.ok === false`, never as exceptions.
#[wasm_bindgen]
pub struct ReversiSession {
    controller: Controller,
    session: Session,
}

#[wasm_bindgen]
impl ReversiSession {
    /// `config` may be `undefined` for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ReversiSession, JsError> {
        let config: ControllerConfig = if config.is_undefined() || config.is_null() {
            ControllerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let controller = Controller::new(config);
        let session = controller.new_session();
        Ok(Self {
            controller,
            session,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.session.id().to_string()
    }

    #[wasm_bindgen(getter, js_name = gameSession)]
    pub fn game_session(&self) -> String {
        self.session.game_session().to_string()
    }

    /// Abandons the current game and starts over from the opening.
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) -> Result<JsValue, JsError> {
        let result = self.controller.restart(&mut self.session);
        self.reply(result)
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.session.snapshot())?)
    }

    #[wasm_bindgen(js_name = playBlack)]
    pub fn play_black(
        &mut self,
        mv: &str,
        claimed_sequence: Option<u32>,
    ) -> Result<JsValue, JsError> {
        self.play(Color::Black, mv, claimed_sequence)
    }

    #[wasm_bindgen(js_name = playWhite)]
    pub fn play_white(
        &mut self,
        mv: &str,
        claimed_sequence: Option<u32>,
    ) -> Result<JsValue, JsError> {
        self.play(Color::White, mv, claimed_sequence)
    }

    /// Restores a snapshot exported earlier by `state()`.
    pub fn restore(
        &mut self,
        state: JsValue,
        claimed_sequence: Option<u32>,
    ) -> Result<JsValue, JsError> {
        let result = serde_wasm_bindgen::from_value::<ExportState>(state)
            .map_err(|err| GameError::invalid_state(err.to_string()))
            .and_then(|snapshot| {
                self.controller
                    .restore(&mut self.session, snapshot, claimed_sequence.map(u64::from))
                    .map(|_| ())
            });
        let result = match result {
            Ok(()) => PlayResult::accepted(),
            Err(err) => PlayResult::rejected(&err),
        };
        self.reply(result)
    }
}

impl ReversiSession {
    fn play(
        &mut self,
        color: Color,
        mv: &str,
        claimed_sequence: Option<u32>,
    ) -> Result<JsValue, JsError> {
        let result = self.controller.play(
            &mut self.session,
            color,
            claimed_sequence.map(u64::from),
            mv,
        );
        self.reply(result)
    }

    fn reply(&self, result: PlayResult) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&ToolReply::of(
            &self.session,
            result,
        ))?)
    }
}
