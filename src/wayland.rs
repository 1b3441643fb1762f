// Wayland integration module
// Creates the viewer window and feeds seat and configure events into the app state

use crate::app::{initial_window_size, AppState, MouseButton};
use crate::frame;
use crate::image_loader::ImageData;
use crate::wgpu_renderer::WgpuRenderer;
use anyhow::{Context, Result};
use log::{debug, error, info};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_output, delegate_pointer, delegate_registry,
    delegate_seat, delegate_xdg_shell, delegate_xdg_window,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Keysym, Modifiers},
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        xdg::{
            window::{Window, WindowConfigure, WindowDecorations, WindowHandler},
            XdgShell,
        },
        WaylandSurface,
    },
};
use std::path::PathBuf;
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_keyboard, wl_output, wl_pointer, wl_seat, wl_surface},
    Connection, Proxy, QueueHandle,
};

/// Mouse button constants
const BTN_LEFT: u32 = 272;

/// Surface-local scroll distance of one wheel notch
const AXIS_UNITS_PER_NOTCH: f64 = 10.0;

/// Used when no output reports a mode
const FALLBACK_DISPLAY: (u32, u32) = (1920, 1080);

/// Main Wayland application state
struct WaylandApp {
    registry_state: RegistryState,
    seat_state: SeatState,
    output_state: OutputState,
    _compositor_state: CompositorState,
    _xdg_shell: XdgShell,

    // Wayland display pointer (for GPU rendering)
    display_ptr: *mut std::ffi::c_void,

    window: Window,
    state: AppState,
    image: ImageData,
    output_path: PathBuf,

    renderer: Option<WgpuRenderer>,
    // Startup failure raised inside a callback, reported by the loop
    fatal: Option<anyhow::Error>,
}

impl WaylandApp {
    /// Create the renderer and upload the image once the window has a size
    fn init_renderer(&mut self) {
        let surface_ptr = self.window.wl_surface().id().as_ptr() as *mut std::ffi::c_void;
        let (width, height) = (
            self.state.viewport.width as u32,
            self.state.viewport.height as u32,
        );

        debug!("  Surface ptr: {:?}", surface_ptr);
        debug!("  Display ptr: {:?}", self.display_ptr);

        let result = WgpuRenderer::new(self.display_ptr, surface_ptr, width, height)
            .context("Failed to initialize GPU renderer")
            .and_then(|mut renderer| {
                renderer.upload_image(&self.image)?;
                Ok(renderer)
            });

        match result {
            Ok(renderer) => {
                info!("GPU renderer initialized successfully");
                self.renderer = Some(renderer);
            }
            Err(e) => {
                self.fatal = Some(e);
                self.state.request_exit();
            }
        }
    }
}

/// Convert a vertical axis event into wheel notches, positive zooming in
fn scroll_notches(absolute: f64, discrete: i32) -> f64 {
    if discrete != 0 {
        -(discrete as f64)
    } else {
        -absolute / AXIS_UNITS_PER_NOTCH
    }
}

impl CompositorHandler for WaylandApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
        debug!("Scale factor changed");
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("Transform changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for WaylandApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("New output detected");
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output updated");
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output destroyed");
    }
}

impl WindowHandler for WaylandApp {
    fn request_close(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _window: &Window) {
        info!("Window closed");
        self.state.request_exit();
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _window: &Window,
        configure: WindowConfigure,
        _serial: u32,
    ) {
        debug!("Window configured: {:?}", configure.new_size);

        // The compositor leaves the size to us when it sends none
        let width = configure
            .new_size
            .0
            .map_or(self.state.viewport.width as u32, |w| w.get());
        let height = configure
            .new_size
            .1
            .map_or(self.state.viewport.height as u32, |h| h.get());
        self.state.on_resize(width, height);

        match self.renderer.as_mut() {
            Some(renderer) => renderer.resize(width, height),
            None if self.fatal.is_none() => self.init_renderer(),
            None => {}
        }
    }
}

impl SeatHandler for WaylandApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("New seat");
    }

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        debug!("New capability: {:?}", capability);

        if capability == Capability::Keyboard {
            if let Err(e) = self.seat_state.get_keyboard(qh, &seat, None) {
                error!("Failed to get keyboard: {}", e);
            }
        }
        if capability == Capability::Pointer {
            if let Err(e) = self.seat_state.get_pointer(qh, &seat) {
                error!("Failed to get pointer: {}", e);
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        _capability: Capability,
    ) {
        debug!("Capability removed");
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("Seat removed");
    }
}

impl KeyboardHandler for WaylandApp {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
        debug!("Keyboard entered surface");
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
    ) {
        debug!("Keyboard left surface");
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        // Close on Escape or Q key
        if event.keysym == Keysym::Escape || event.keysym == Keysym::q {
            info!("Exit key pressed");
            self.state.request_exit();
        }
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _event: KeyEvent,
    ) {
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _modifiers: Modifiers,
        _layout: u32,
    ) {
    }
}

impl PointerHandler for WaylandApp {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            let (x, y) = event.position;
            match event.kind {
                PointerEventKind::Enter { .. } => {
                    self.state.on_pointer_enter(x, y);
                }
                PointerEventKind::Leave { .. } => {
                    debug!("Pointer left");
                    self.state.on_pointer_leave();
                }
                PointerEventKind::Motion { .. } => {
                    self.state.on_cursor_motion(x, y);
                }
                PointerEventKind::Press { button, .. } => {
                    debug!("Pointer button pressed: {}", button);
                    self.state.on_button(mouse_button(button), true);
                }
                PointerEventKind::Release { button, .. } => {
                    self.state.on_button(mouse_button(button), false);
                }
                PointerEventKind::Axis { vertical, .. } => {
                    self.state
                        .on_scroll(scroll_notches(vertical.absolute, vertical.discrete));
                }
            }
        }
    }
}

fn mouse_button(button: u32) -> MouseButton {
    if button == BTN_LEFT {
        MouseButton::Primary
    } else {
        MouseButton::Other
    }
}

impl ProvidesRegistryState for WaylandApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}

// Delegate macros
delegate_compositor!(WaylandApp);
delegate_output!(WaylandApp);
delegate_xdg_shell!(WaylandApp);
delegate_xdg_window!(WaylandApp);
delegate_seat!(WaylandApp);
delegate_keyboard!(WaylandApp);
delegate_pointer!(WaylandApp);
delegate_registry!(WaylandApp);

/// Run the Wayland application until the window is closed
pub fn run(image: ImageData, output_path: PathBuf) -> Result<()> {
    info!("Connecting to Wayland display");

    // Connect to Wayland display
    let conn = Connection::connect_to_env().context("Failed to connect to Wayland display")?;

    // Initialize registry and event queue
    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("Failed to initialize registry")?;
    let qh = event_queue.handle();

    // Initialize required globals
    let compositor_state =
        CompositorState::bind(&globals, &qh).context("Failed to bind compositor")?;
    let xdg_shell = XdgShell::bind(&globals, &qh).context("Failed to bind xdg shell")?;

    // Get the display pointer for GPU rendering
    let display_ptr = conn.backend().display_ptr() as *mut std::ffi::c_void;

    let surface = compositor_state.create_surface(&qh);
    let window = xdg_shell.create_window(surface, WindowDecorations::RequestServer, &qh);
    window.set_title("ivac");
    window.set_app_id("ivac");

    let mut app = WaylandApp {
        registry_state: RegistryState::new(&globals),
        seat_state: SeatState::new(&globals, &qh),
        output_state: OutputState::new(&globals, &qh),
        _compositor_state: compositor_state,
        _xdg_shell: xdg_shell,
        display_ptr,
        window,
        state: AppState::new(image.width, image.height),
        image,
        output_path,
        renderer: None,
        fatal: None,
    };

    // Dispatch once to get output info
    event_queue.roundtrip(&mut app)?;

    let display = get_display_dimensions(&app.output_state);
    let (width, height) = initial_window_size((app.image.width, app.image.height), display);
    info!(
        "Display dimensions: {}x{}, window size: {}x{}",
        display.0, display.1, width, height
    );
    app.state.on_resize(width, height);

    // Commit the surface to trigger configure
    app.window.commit();

    info!("Starting event loop");
    info!("Controls: drag to pan, scroll to zoom, drag the right slider for contrast");
    info!("Top-left button saves to {}", app.output_path.display());

    // Main event loop
    loop {
        event_queue.blocking_dispatch(&mut app)?;

        if let Some(e) = app.fatal.take() {
            return Err(e);
        }

        if app.state.should_exit {
            info!("Exiting application");
            break;
        }

        if let Some(renderer) = app.renderer.as_mut() {
            frame::tick(&mut app.state, &app.image, renderer, &app.output_path);
        }
    }

    Ok(())
}

/// Get display dimensions from the output state
fn get_display_dimensions(output_state: &OutputState) -> (u32, u32) {
    for output in output_state.outputs() {
        if let Some(info) = output_state.info(&output) {
            if let Some(mode) = info.modes.iter().find(|m| m.current) {
                return (mode.dimensions.0 as u32, mode.dimensions.1 as u32);
            }
            if let Some(mode) = info.modes.first() {
                return (mode.dimensions.0 as u32, mode.dimensions.1 as u32);
            }
        }
    }
    FALLBACK_DISPLAY
}
