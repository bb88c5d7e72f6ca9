use clap::Parser;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use std::sync::Arc;

use blitline::cli::Cli;
use blitline::game::{Game, LoopControl, SCREEN_HEIGHT, SCREEN_WIDTH};
use blitline::line::Point;

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    game: Game,
    cursor: PhysicalPosition<f64>,
    dragging: bool,
    failed: bool,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            game: Game::new(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            dragging: false,
            failed: false,
        }
    }

    fn cursor_point(&self) -> Point {
        Point::new(self.cursor.x as i32, self.cursor.y as i32)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("blitline")
                .with_resizable(false)
                .with_inner_size(winit::dpi::PhysicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                self.failed = true;
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = pollster::block_on(self.game.init(window.clone(), &self.cli)) {
            log::error!("initialization failed: {e}");
            self.game.shutdown();
            self.failed = true;
            event_loop.exit();
            return;
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.game.request_exit(),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                if self.dragging {
                    self.game.pointer_dragged(self.cursor_point());
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.dragging = true;
                    self.game.pointer_pressed(self.cursor_point());
                }
                ElementState::Released => self.dragging = false,
            },
            WindowEvent::RedrawRequested => match self.game.frame() {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Exit) => event_loop.exit(),
                Err(e) => {
                    log::error!("render failed: {e}");
                    self.failed = true;
                    event_loop.exit();
                }
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.game.shutdown();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);

    event_loop.run_app(&mut app)?;

    if app.failed {
        anyhow::bail!("exited after a fatal error");
    }
    Ok(())
}
