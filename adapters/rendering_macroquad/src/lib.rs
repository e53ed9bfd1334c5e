#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Dengue Patrol.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter uses Macroquad's immediate-mode UI module for the game over
//! window. All UI-specific calls live inside the local `ui` module to avoid
//! leaking Macroquad UI types throughout the renderer.

mod ui;

use self::ui::{draw_game_over_ui, GameOverUiContext};
use anyhow::Result;
use dengue_patrol_core::MovementIntent;
use dengue_patrol_rendering::{
    ArenaPresentation, Color, FrameInput, Hud, MosquitoPresentation, PlayerPresentation,
    Presentation, RenderingBackend, Scene, SitePresentation, SprayEffect,
};
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::{
    color::{BLACK, WHITE},
    input::{is_key_down, is_key_pressed, KeyCode},
};
use std::time::{Duration, Instant};

/// One-frame latch for the "Play again" button; the press is reported on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct RestartLatch {
    pending: bool,
}

impl RestartLatch {
    /// Reports a pending restart and clears it.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Records a button press from the game over panel.
    pub fn press(&mut self) {
        self.pending = true;
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `R` or `Enter` starts a new round.
    restart: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let restart = is_key_pressed(KeyCode::R) || is_key_pressed(KeyCode::Enter);

        Self {
            quit_requested,
            restart,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the averages once one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / seconds,
            avg_render: self.render_accum / self.frames.max(1),
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.arena.width.round() as i32,
            window_height: scene.arena.height.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut restart_latch = RestartLatch::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = FrameInput {
                    movement: sample_movement(),
                    spray_held: is_key_down(KeyCode::Space),
                    restart: restart_latch.take() || keyboard.restart,
                };

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_arena(&scene.arena, screen_width, screen_height);

                let render_start = Instant::now();
                draw_arena(&scene.arena, &metrics);
                draw_sites(&scene.sites, &metrics);
                draw_spray_effects(scene.hud.spray_effects(), &metrics);
                draw_mosquitoes(&scene.mosquitoes, &metrics);
                draw_player(&scene.player, &metrics);
                draw_hud(&scene.hud, &scene.player, &metrics, screen_width, screen_height);

                if let Some(banner) = scene.hud.game_over() {
                    let size = MacroquadVec2::new(320.0, 180.0);
                    let context = GameOverUiContext {
                        origin: MacroquadVec2::new(
                            (screen_width - size.x) * 0.5,
                            (screen_height - size.y) * 0.5,
                        ),
                        size,
                        background: macroquad::color::Color::from_rgba(20, 20, 20, 230),
                        banner,
                    };
                    let mut game_over_ui = macroquad::ui::root_ui();
                    if draw_game_over_ui(&mut game_over_ui, context) {
                        restart_latch.press();
                    }
                }

                let render_duration = render_start.elapsed();
                let fps_metrics = fps_counter.record_frame(frame_dt, render_duration);
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        avg_render,
                    }) = fps_metrics
                    {
                        println!(
                            "FPS: {:.2} | render: {:>6.2}ms",
                            per_second,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn sample_movement() -> MovementIntent {
    MovementIntent {
        left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
        right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
        up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
        down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn from_arena(arena: &ArenaPresentation, screen_width: f32, screen_height: f32) -> Self {
        let scale = if arena.width <= f32::EPSILON || arena.height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / arena.width).min(screen_height / arena.height)
        };

        let offset_x = ((screen_width - arena.width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - arena.height * scale) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn to_screen(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + position.x * self.scale,
            self.offset_y + position.y * self.scale,
        )
    }
}

fn draw_arena(arena: &ArenaPresentation, metrics: &SceneMetrics) {
    let origin = metrics.to_screen(Vec2::ZERO);
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        arena.width * metrics.scale,
        arena.height * metrics.scale,
        to_macroquad_color(arena.wall),
    );

    let inner = metrics.to_screen(Vec2::splat(arena.border));
    let inner_width = (arena.width - arena.border * 2.0).max(0.0) * metrics.scale;
    let inner_height = (arena.height - arena.border * 2.0).max(0.0) * metrics.scale;
    macroquad::shapes::draw_rectangle(
        inner.x,
        inner.y,
        inner_width,
        inner_height,
        to_macroquad_color(arena.floor),
    );
}

fn draw_sites(sites: &[SitePresentation], metrics: &SceneMetrics) {
    for site in sites {
        let center = metrics.to_screen(site.position);
        let side = site.half_extent * 2.0 * metrics.scale;
        let left = center.x - side * 0.5;
        let top = center.y - side * 0.5;
        macroquad::shapes::draw_rectangle(left, top, side, side, to_macroquad_color(site.color));
        if site.clearing {
            macroquad::shapes::draw_rectangle_lines(left, top, side, side, 3.0, WHITE);
        }
        if let Some(label) = site.label {
            let size = 12.0 * metrics.scale.max(0.5);
            let width = text_width(label, size);
            draw_label(label, center.x - width * 0.5, top + side + size, size, WHITE);
        }
    }
}

fn draw_spray_effects(effects: &[SprayEffect], metrics: &SceneMetrics) {
    for effect in effects {
        let center = metrics.to_screen(effect.origin);
        let radius = effect.radius * effect.progress.max(0.05) * metrics.scale;
        let alpha = (1.0 - effect.progress).clamp(0.0, 1.0);
        let fill = Color::from_rgb_u8(190, 240, 255).with_alpha(alpha * 0.35);
        let outline = Color::from_rgb_u8(255, 255, 255).with_alpha(alpha);
        macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(fill));
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            radius,
            2.0,
            to_macroquad_color(outline),
        );
    }
}

fn draw_mosquitoes(mosquitoes: &[MosquitoPresentation], metrics: &SceneMetrics) {
    for mosquito in mosquitoes {
        let center = metrics.to_screen(mosquito.position);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            mosquito.radius * metrics.scale,
            to_macroquad_color(mosquito.color),
        );
    }
}

fn draw_player(player: &PlayerPresentation, metrics: &SceneMetrics) {
    if !player.visible {
        return;
    }
    let center = metrics.to_screen(player.position);
    let side = player.half_extent * 2.0 * metrics.scale;
    macroquad::shapes::draw_rectangle(
        center.x - side * 0.5,
        center.y - side * 0.5,
        side,
        side,
        to_macroquad_color(player.color),
    );
    macroquad::shapes::draw_rectangle_lines(
        center.x - side * 0.5,
        center.y - side * 0.5,
        side,
        side,
        2.0,
        BLACK,
    );
}

fn draw_hud(
    hud: &Hud,
    player: &PlayerPresentation,
    metrics: &SceneMetrics,
    screen_width: f32,
    screen_height: f32,
) {
    draw_label(&hud.score_text(), 16.0, 36.0, 28.0, WHITE);
    draw_label(&hud.sites_text(), 16.0, 64.0, 20.0, WHITE);

    let clock = hud.clock_text();
    let clock_color = if hud.clock_is_urgent() {
        macroquad::color::RED
    } else {
        WHITE
    };
    let clock_width = text_width(&clock, 28.0);
    draw_label(&clock, screen_width - 16.0 - clock_width, 36.0, 28.0, clock_color);

    let heart_spacing = 40.0;
    let first_heart = screen_width * 0.5 - heart_spacing * f32::from(hud.max_hearts()) * 0.5;
    for slot in 0..hud.max_hearts() {
        let x = first_heart + heart_spacing * (f32::from(slot) + 0.5);
        let color = if slot < hud.hearts() {
            Color::from_rgb_u8(220, 30, 60)
        } else {
            Color::from_rgb_u8(60, 60, 60).with_alpha(0.6)
        };
        macroquad::shapes::draw_circle(x, 30.0, 12.0, to_macroquad_color(color));
    }

    draw_spray_dial(hud.spray_fraction(), screen_width, screen_height);

    if let Some(message) = hud.message() {
        let width = text_width(message, 28.0);
        draw_label(
            message,
            (screen_width - width) * 0.5,
            screen_height * 0.25,
            28.0,
            WHITE,
        );
    }

    if let Some(clearing) = hud.clearing_text() {
        let above = metrics.to_screen(player.position);
        let width = text_width(&clearing, 18.0);
        let y = above.y - player.half_extent * metrics.scale - 12.0;
        draw_label(&clearing, above.x - width * 0.5, y, 18.0, WHITE);
    }
}

fn draw_spray_dial(fraction: f32, screen_width: f32, screen_height: f32) {
    let size = 100.0;
    let left = screen_width - size - 10.0;
    let top = screen_height - size - 10.0;
    let backdrop = Color::new(0.0, 0.0, 0.0, 0.5);
    macroquad::shapes::draw_rectangle(left, top, size, size, to_macroquad_color(backdrop));

    let fraction = fraction.clamp(0.0, 1.0);
    let fill = if fraction >= 1.0 {
        Color::from_rgb_u8(80, 200, 120)
    } else {
        Color::from_rgb_u8(200, 160, 60)
    };
    let filled = size * fraction;
    macroquad::shapes::draw_rectangle(
        left,
        top + size - filled,
        size,
        filled,
        to_macroquad_color(fill.with_alpha(0.6)),
    );

    let caption = "SPRAY";
    let width = text_width(caption, 20.0);
    draw_label(caption, left + (size - width) * 0.5, top + size * 0.5, 20.0, WHITE);
    let hint = "SPACE";
    let width = text_width(hint, 14.0);
    draw_label(hint, left + (size - width) * 0.5, top + size - 10.0, 14.0, WHITE);
}

fn draw_label(text: &str, x: f32, y: f32, font_size: f32, color: macroquad::color::Color) {
    let _ = macroquad::text::draw_text(text, x, y, font_size, color);
}

fn text_width(text: &str, font_size: f32) -> f32 {
    macroquad::text::measure_text(text, None, font_size.round() as u16, 1.0).width
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dengue_patrol_core::Rules;

    fn arena() -> ArenaPresentation {
        ArenaPresentation::from_rules(&Rules::default()).expect("default arena")
    }

    #[test]
    fn metrics_fit_the_arena_inside_the_window() {
        let metrics = SceneMetrics::from_arena(&arena(), 1_600.0, 900.0);

        assert_eq!(metrics.scale, 1.5);
        assert_eq!(metrics.offset_x, 200.0);
        assert_eq!(metrics.offset_y, 0.0);
        assert_eq!(
            metrics.to_screen(Vec2::new(400.0, 300.0)),
            Vec2::new(800.0, 450.0)
        );
    }

    #[test]
    fn metrics_use_unit_scale_for_matching_window() {
        let metrics = SceneMetrics::from_arena(&arena(), 800.0, 600.0);

        assert_eq!(metrics.scale, 1.0);
        assert_eq!(metrics.to_screen(Vec2::new(32.0, 32.0)), Vec2::new(32.0, 32.0));
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..3 {
            assert!(counter
                .record_frame(Duration::from_millis(250), Duration::from_millis(2))
                .is_none());
        }
        let metrics = counter
            .record_frame(Duration::from_millis(250), Duration::from_millis(2))
            .expect("one second elapsed");

        assert_eq!(metrics.per_second, 4.0);
        assert_eq!(metrics.avg_render, Duration::from_millis(2));
        assert!(counter
            .record_frame(Duration::from_millis(250), Duration::from_millis(2))
            .is_none());
    }
}
