//! Canvas 2D renderer

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::sprites::Sprites;
use crate::error::{CannonError, Result};
use crate::sim::{Projectile, Simulation};

/// Draws a frame: clear, cannon body, cannon base, projectiles
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    pub size: (f64, f64),
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| CannonError::MissingElement("2d canvas context".to_string()))?;
        Ok(Self {
            ctx,
            size: (canvas.width() as f64, canvas.height() as f64),
        })
    }

    pub fn render(&self, sim: &Simulation, sprites: &Sprites) -> std::result::Result<(), JsValue> {
        let (w, h) = self.size;
        self.ctx.clear_rect(0.0, 0.0, w, h);

        self.draw_body(sim, sprites)?;

        let base_pos = sim.cannon.base_origin(&sim.bounds);
        let base_size = sim.cannon.base_size();
        self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            &sprites.base,
            base_pos.x,
            base_pos.y,
            base_size.x,
            base_size.y,
        )?;

        let size = sim.tuning.projectile_size;
        for p in sim.store.as_slice() {
            self.draw_projectile(p, size, sprites)?;
        }
        Ok(())
    }

    fn draw_body(&self, sim: &Simulation, sprites: &Sprites) -> std::result::Result<(), JsValue> {
        let cannon = &sim.cannon;
        let attach = cannon.attach_point(&sim.bounds);
        let body = cannon.body_size();

        self.ctx.save();
        self.ctx.translate(attach.x, attach.y)?;
        self.ctx.rotate(cannon.body_rotation(sim.params.angle()))?;
        self.ctx.translate(-cannon.body_pivot.x, -cannon.body_pivot.y)?;
        let drawn = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(&sprites.body, 0.0, 0.0, body.x, body.y);
        self.ctx.restore();
        drawn
    }

    fn draw_projectile(
        &self,
        p: &Projectile,
        size: f64,
        sprites: &Sprites,
    ) -> std::result::Result<(), JsValue> {
        self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            &sprites.projectile,
            p.pos.x,
            p.pos.y,
            size,
            size,
        )
    }

    /// Paint an error message in place of the scene (failed asset gate)
    pub fn render_error(&self, message: &str) {
        let (w, h) = self.size;
        self.ctx.clear_rect(0.0, 0.0, w, h);
        self.ctx.set_fill_style_str("#c0392b");
        self.ctx.set_font("24px sans-serif");
        let _ = self.ctx.fill_text(message, 20.0, h / 2.0);
    }
}
