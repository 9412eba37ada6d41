//! Canvas 2D rendering
//!
//! Draws the play field into a `<canvas>` and keeps the DOM HUD (score,
//! title/end screens, touch buttons) in sync. Read-only over `GameState`.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::consts::*;
use crate::input::Affordances;
use crate::sim::{GamePhase, GameState};

const BACKGROUND: &str = "black";
const PLAYER_COLOR: &str = "#3cf03c";
const INVADER_COLOR: &str = "#e0e0e0";
const BULLET_COLOR: &str = "white";

/// Player sprite height (it sits 10px above the bottom edge)
const PLAYER_HEIGHT: f64 = 50.0;
const BULLET_WIDTH: f64 = 4.0;
const BULLET_HEIGHT: f64 = 10.0;

/// Renderer bound to one canvas
pub struct CanvasRenderer {
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(document: Document, canvas_id: &str) -> Option<Self> {
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)?
            .dyn_into()
            .ok()?;
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
        canvas.set_height(FIELD_HEIGHT as u32);
        Some(Self {
            document,
            canvas,
            ctx,
        })
    }

    /// Draw one frame
    pub fn render(&self, state: &GameState) {
        let width = state.field_width.max(0) as u32;
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }

        let ctx = &self.ctx;
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, width as f64, FIELD_HEIGHT as f64);

        if state.phase != GamePhase::Playing {
            return;
        }

        // Ship: body plus a turret over the gun
        let ship_top = FIELD_HEIGHT as f64 - 10.0 - PLAYER_HEIGHT;
        ctx.set_fill_style_str(PLAYER_COLOR);
        ctx.fill_rect(
            state.player_x as f64,
            ship_top + PLAYER_HEIGHT * 0.4,
            PLAYER_WIDTH as f64,
            PLAYER_HEIGHT * 0.6,
        );
        ctx.fill_rect(
            (state.player_x + PLAYER_GUN_OFFSET) as f64 - 8.0,
            ship_top,
            16.0,
            PLAYER_HEIGHT * 0.4,
        );

        let size = INVADER_SIZE as f64;
        for invader in &state.invaders {
            let (x, y) = (invader.pos.x as f64, invader.pos.y as f64);
            ctx.set_fill_style_str(INVADER_COLOR);
            ctx.fill_rect(x + size * 0.1, y + size * 0.2, size * 0.8, size * 0.6);
            ctx.fill_rect(x, y + size * 0.5, size * 0.15, size * 0.4);
            ctx.fill_rect(x + size * 0.85, y + size * 0.5, size * 0.15, size * 0.4);
            ctx.set_fill_style_str(BACKGROUND);
            ctx.fill_rect(x + size * 0.25, y + size * 0.35, size * 0.12, size * 0.12);
            ctx.fill_rect(x + size * 0.63, y + size * 0.35, size * 0.12, size * 0.12);
        }

        ctx.set_fill_style_str(BULLET_COLOR);
        for bullet in &state.bullets {
            ctx.fill_rect(
                bullet.pos.x as f64 - BULLET_WIDTH / 2.0,
                bullet.pos.y as f64 - BULLET_HEIGHT / 2.0,
                BULLET_WIDTH,
                BULLET_HEIGHT,
            );
        }
    }

    /// Update HUD elements in DOM
    pub fn update_hud(&self, state: &GameState, affordances: &Affordances) {
        self.set_text("hud-score", &state.score.to_string());
        self.set_text("hud-level", &state.level.to_string());
        self.set_text("high-score", &state.high_score.to_string());
        self.set_text("start-prompt", affordances.start_prompt);

        self.set_visible("start-screen", state.phase == GamePhase::Start);
        self.set_visible("hud", state.phase == GamePhase::Playing);
        self.set_visible(
            "touch-controls",
            affordances.touch_buttons && state.phase == GamePhase::Playing,
        );

        let ended = state.phase.is_terminal();
        self.set_visible("end-screen", ended);
        if ended {
            let title = if state.phase == GamePhase::Victory {
                "YOU WIN!"
            } else {
                "GAME OVER"
            };
            self.set_text("end-title", title);
            self.set_text("final-score", &state.score.to_string());
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_visible(&self, id: &str, visible: bool) {
        if let Some(el) = self.document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }
}
