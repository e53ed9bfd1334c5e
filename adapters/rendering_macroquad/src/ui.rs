//! Game over panel drawn with `macroquad::ui`.

use dengue_patrol_rendering::GameOverBanner;
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Skin, Ui},
};

const VICTORY_ACCENT: Color = Color::new(0.22, 0.62, 0.32, 1.0);
const DEFEAT_ACCENT: Color = Color::new(0.68, 0.2, 0.2, 1.0);

/// Layout and round result for the game over panel.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GameOverUiContext {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    pub(crate) background: Color,
    /// Result of the round that just ended.
    pub(crate) banner: GameOverBanner,
}

/// Renders the panel and reports whether "Play again" was pressed this frame.
pub(crate) fn draw_game_over_ui(ui: &mut Ui, context: GameOverUiContext) -> bool {
    let accent = if context.banner.won {
        VICTORY_ACCENT
    } else {
        DEFEAT_ACCENT
    };
    let skin = outcome_skin(ui, context.background, accent);
    ui.push_skin(&skin);

    let mut play_again = false;
    let _ = ui.window(hash!("game_over"), context.origin, context.size, |ui| {
        ui.label(None, headline(context.banner));
        ui.label(None, &format!("Final score: {}", context.banner.final_score));
        ui.label(None, "Press R or use the button below.");
        play_again = ui.button(None, "Play again");
    });

    ui.pop_skin();
    play_again
}

fn headline(banner: GameOverBanner) -> &'static str {
    if banner.won {
        "Every breeding site is gone!"
    } else {
        "The mosquitoes won this round"
    }
}

/// Flat panel in `background` with a button tinted by the round outcome.
fn outcome_skin(ui: &mut Ui, background: Color, accent: Color) -> Skin {
    let pressed = shade(accent, 0.75);
    let hovered = shade(accent, 1.25);

    let mut skin = ui.default_skin();
    skin.margin = 0.0;
    skin.window_style = ui
        .style_builder()
        .color(background)
        .color_hovered(background)
        .color_clicked(background)
        .color_inactive(background)
        .margin(RectOffset::new(20.0, 20.0, 18.0, 18.0))
        .build();
    skin.label_style = ui
        .style_builder()
        .text_color(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 6.0, 6.0))
        .build();
    skin.button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .color(accent)
        .color_hovered(hovered)
        .color_clicked(pressed)
        .margin(RectOffset::new(12.0, 12.0, 8.0, 8.0))
        .build();
    skin
}

fn shade(color: Color, factor: f32) -> Color {
    Color::new(
        (color.r * factor).clamp(0.0, 1.0),
        (color.g * factor).clamp(0.0, 1.0),
        (color.b * factor).clamp(0.0, 1.0),
        color.a,
    )
}
