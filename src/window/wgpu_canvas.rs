//! A winit window and the wgpu surface it presents to.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use crate::config::WindowConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::event::{Action, Key, Modifiers, MouseButton, WindowEvent};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent as WinitWindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{Window, WindowAttributes, WindowId};

// winit only allows one EventLoop per program and it is neither Send nor Sync.
thread_local! {
    static EVENT_LOOP: RefCell<Option<EventLoop<()>>> = const { RefCell::new(None) };
}

/// Raw events gathered while pumping the event loop, before they are converted to logical
/// pixels and tagged with the current modifiers.
#[derive(Clone, Copy, Debug)]
enum PendingEvent {
    Close,
    Resize { width: u32, height: u32 },
    ScaleFactor(f64),
    CursorPos(f64, f64),
    MouseButton(MouseButton, Action),
    Scroll(f64, f64),
    Key(Key, Action),
    Modifiers(ModifiersState),
}

struct EventCollector {
    window_id: WindowId,
    events: Vec<PendingEvent>,
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WinitWindowEvent,
    ) {
        if window_id != self.window_id {
            return;
        }

        let pending = match event {
            WinitWindowEvent::CloseRequested => PendingEvent::Close,
            WinitWindowEvent::Resized(size) => PendingEvent::Resize {
                width: size.width,
                height: size.height,
            },
            WinitWindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                PendingEvent::ScaleFactor(scale_factor)
            }
            WinitWindowEvent::CursorMoved { position, .. } => {
                PendingEvent::CursorPos(position.x, position.y)
            }
            WinitWindowEvent::MouseInput { state, button, .. } => {
                PendingEvent::MouseButton(translate_mouse_button(button), translate_action(state))
            }
            WinitWindowEvent::MouseWheel { delta, .. } => {
                let (x, y) = match delta {
                    MouseScrollDelta::LineDelta(dx, dy) => (dx as f64 * 10.0, dy as f64 * 10.0),
                    MouseScrollDelta::PixelDelta(delta) => (delta.x, delta.y),
                };
                PendingEvent::Scroll(x, y)
            }
            WinitWindowEvent::KeyboardInput { event, .. } => {
                PendingEvent::Key(translate_key(event.physical_key), translate_action(event.state))
            }
            WinitWindowEvent::ModifiersChanged(modifiers) => {
                PendingEvent::Modifiers(modifiers.state())
            }
            _ => return,
        };

        self.events.push(pending);
    }
}

/// The window, its surface, and the depth and multisampled targets sized to it.
pub struct WgpuCanvas {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    modifiers_state: ModifiersState,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    sample_count: u32,
}

impl WgpuCanvas {
    /// Opens a window and initializes the wgpu context the renderers draw with.
    pub async fn open(config: &WindowConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64));

        let window = EVENT_LOOP.with(|event_loop_cell| -> Result<Window> {
            let mut event_loop_opt = event_loop_cell.borrow_mut();
            if event_loop_opt.is_none() {
                let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
                *event_loop_opt = Some(event_loop);
            }

            let event_loop = event_loop_opt
                .as_ref()
                .ok_or_else(|| Error::Window("no event loop".to_string()))?;
            #[allow(deprecated)]
            event_loop
                .create_window(window_attrs)
                .map_err(|e| Error::Window(e.to_string()))
        })?;
        let window = Arc::new(window);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("wip3d device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
            })
            .await
            .map_err(|e| Error::Gpu(e.to_string()))?;

        // Non-sRGB targets: the shaders encode sRGB themselves.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| Error::Gpu("the surface supports no texture format".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!(
            "Rendering with {} ({:?}), surface format {:?}.",
            adapter.get_info().name,
            adapter.get_info().backend,
            surface_format
        );

        let ctxt = Context::init(instance, device, queue, adapter, surface_format);

        let size = window.inner_size();
        let present_mode = if config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctxt.device, &surface_config);

        let sample_count = config.msaa.max(1);
        let depth_view = Self::create_depth_texture(
            &ctxt.device,
            surface_config.width,
            surface_config.height,
            sample_count,
        );
        let msaa_view = (sample_count > 1).then(|| {
            Self::create_msaa_texture(
                &ctxt.device,
                surface_config.width,
                surface_config.height,
                surface_format,
                sample_count,
            )
        });

        Ok(WgpuCanvas {
            window,
            surface,
            surface_config,
            modifiers_state: ModifiersState::default(),
            depth_view,
            msaa_view,
            sample_count,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: sample_count.max(1),
            dimension: wgpu::TextureDimension::D2,
            format: Context::depth_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Pumps the window system and returns the events received since the last call.
    ///
    /// Positions and sizes are converted to logical pixels. A resize reconfigures the
    /// surface before being reported.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut collector = EventCollector {
            window_id: self.window.id(),
            events: Vec::new(),
        };

        EVENT_LOOP.with(|event_loop_cell| {
            if let Some(ref mut event_loop) = *event_loop_cell.borrow_mut() {
                let _ = event_loop.pump_app_events(Some(Duration::ZERO), &mut collector);
            }
        });

        let mut out = Vec::with_capacity(collector.events.len());
        for pending in collector.events {
            let scale = self.scale_factor();
            let modifiers = translate_modifiers(self.modifiers_state);

            let event = match pending {
                PendingEvent::Close => WindowEvent::Close,
                PendingEvent::Resize { width, height } => {
                    self.resize(width, height);
                    let logical = winit::dpi::PhysicalSize::new(width, height).to_logical(scale);
                    WindowEvent::Resized(logical.width, logical.height)
                }
                PendingEvent::ScaleFactor(ratio) => WindowEvent::ScaleFactorChanged(ratio),
                PendingEvent::CursorPos(x, y) => {
                    WindowEvent::CursorPos(x / scale, y / scale, modifiers)
                }
                PendingEvent::MouseButton(button, action) => {
                    WindowEvent::MouseButton(button, action, modifiers)
                }
                PendingEvent::Scroll(x, y) => WindowEvent::Scroll(x, y, modifiers),
                PendingEvent::Key(key, action) => WindowEvent::Key(key, action, modifiers),
                PendingEvent::Modifiers(state) => {
                    self.modifiers_state = state;
                    continue;
                }
            };

            out.push(event);
        }

        out
    }

    /// Reconfigures the surface and recreates the depth and multisampled targets for a
    /// drawable area of `width` x `height` physical pixels. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if (width, height) == self.size() {
            return;
        }

        // The window is gone if this fails, which the next poll reports anyway.
        let Ok(ctxt) = Context::get() else {
            return;
        };

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&ctxt.device, &self.surface_config);

        self.depth_view = Self::create_depth_texture(&ctxt.device, width, height, self.sample_count);
        if self.sample_count > 1 {
            self.msaa_view = Some(Self::create_msaa_texture(
                &ctxt.device,
                width,
                height,
                self.surface_config.format,
                self.sample_count,
            ));
        }

        log::debug!("Surface resized to {}x{} physical pixels.", width, height);
    }

    /// The next texture to draw into, or `None` if this frame must be skipped.
    pub fn acquire_frame(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let ctxt = Context::get()?;
                self.surface.configure(&ctxt.device, &self.surface_config);
                log::debug!("Surface lost or outdated, reconfigured.");
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for the next surface texture.");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Gets the depth texture view for rendering.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Gets the MSAA texture view if MSAA is enabled.
    pub fn msaa_view(&self) -> Option<&wgpu::TextureView> {
        self.msaa_view.as_ref()
    }

    /// Gets the sample count for MSAA.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Gets the surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// The configured size of the surface, in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// The current size of the drawable area of the window, in physical pixels.
    pub fn inner_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// The scale factor.
    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}

fn translate_action(action: ElementState) -> Action {
    match action {
        ElementState::Pressed => Action::Press,
        ElementState::Released => Action::Release,
    }
}

fn translate_modifiers(modifiers: ModifiersState) -> Modifiers {
    let mut res = Modifiers::empty();
    if modifiers.shift_key() {
        res.insert(Modifiers::Shift)
    }
    if modifiers.control_key() {
        res.insert(Modifiers::Control)
    }
    if modifiers.alt_key() {
        res.insert(Modifiers::Alt)
    }
    if modifiers.super_key() {
        res.insert(Modifiers::Super)
    }
    res
}

fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}

fn translate_key(physical_key: PhysicalKey) -> Key {
    match physical_key {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_are_translated() {
        let state = ModifiersState::SHIFT | ModifiersState::SUPER;
        assert_eq!(
            translate_modifiers(state),
            Modifiers::Shift | Modifiers::Super
        );
        assert!(translate_modifiers(ModifiersState::empty()).is_empty());
    }

    #[test]
    fn only_escape_is_recognized() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyA)), Key::Unknown);
        assert_eq!(
            translate_mouse_button(winit::event::MouseButton::Back),
            MouseButton::Other
        );
    }
}
