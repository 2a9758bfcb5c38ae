/// Terminal front-end for the cube simulation
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{error, info};
use rubix_core::{HostEvent, Key, KeyInput, PointerKind, Simulation, TickReport};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: u32 = 2;

const HELP_LINE: &str = "UDLRFB/MES=Turn Shift=Reverse Tab=Direction Arrows=View \
                         Space=Scramble Esc=Cancel Q=Quit Mouse=Drag";

/// Main application struct for the terminal cube
pub struct TerminalApp {
    simulation: Simulation,
    renderer: AsciiRenderer,
    events: Vec<HostEvent>,
    running: bool,
    last_tick: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mut simulation: Simulation) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        simulation.resize(width as u32, height as u32, height as u32 * CELL_ASPECT);

        let now = Instant::now();
        Ok(Self {
            simulation,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            events: Vec::new(),
            running: true,
            last_tick: now,
            last_fps_sample: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();
        if let Err(err) = &result {
            error!("terminal loop failed: {err}");
        }

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        self.last_tick = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input(event::read()?);
            }

            // Update and render
            let dt = frame_start - self.last_tick;
            self.last_tick = frame_start;
            let events = std::mem::take(&mut self.events);
            let report = self.simulation.tick(dt, events, &mut self.renderer)?;
            self.apply_report(&report);
            self.present()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                if is_interrupt(&key) {
                    self.running = false;
                } else if let Some(input) = translate_key(&key) {
                    self.events.push(HostEvent::Key(input));
                }
            }
            Event::Mouse(mouse) => {
                if let Some(event) = translate_mouse(&mouse) {
                    self.events.push(event);
                }
            }
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.events.push(HostEvent::Resize {
                    width: width as u32,
                    height: height as u32,
                    physical_height: height as u32 * CELL_ASPECT,
                });
            }
            _ => {}
        }
    }

    fn apply_report(&mut self, report: &TickReport) {
        if report.quit {
            info!("quit requested");
            self.running = false;
        }
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let engine = self.simulation.engine();
        let status = if self.simulation.state().is_solved() {
            "solved"
        } else {
            "scrambled"
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Rubix | FPS: {:.1} | Turn: {} | Queued: {}/{} | {}",
                self.fps,
                self.simulation.input().default_direction().name(),
                engine.pending_len(),
                engine.capacity(),
                status,
            )),
        )?;
        if self.renderer.height() > 1 {
            queue!(
                stdout,
                cursor::MoveTo(0, self.renderer.height() as u16 - 1),
                terminal::Clear(ClearType::CurrentLine),
                SetForegroundColor(Color::DarkYellow),
                Print(HELP_LINE),
            )?;
        }
        queue!(stdout, ResetColor)?;

        stdout.flush()?;
        Ok(())
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Crossterm key to host-independent key; releases and repeats on some
/// platforms are dropped.
pub fn translate_key(event: &KeyEvent) -> Option<KeyInput> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    let key = match event.code {
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        _ => return None,
    };
    Some(KeyInput::new(key, shift))
}

/// Left-button gestures only; coordinates are cell centres
pub fn translate_mouse(event: &MouseEvent) -> Option<HostEvent> {
    let kind = match event.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerKind::Press,
        MouseEventKind::Drag(MouseButton::Left) => PointerKind::Drag,
        MouseEventKind::Up(MouseButton::Left) => PointerKind::Release,
        _ => return None,
    };
    Some(HostEvent::Pointer {
        x: event.column as f32 + 0.5,
        y: event.row as f32 + 0.5,
        kind,
    })
}
