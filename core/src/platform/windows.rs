// Copyright 2025 HEM Sp. z o.o.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Win32 surface catalog and overlay backend. The backend owns window
//! creation, placement and layered-window opacity; actual frame rendering
//! belongs to whatever media engine the host embeds into the window, which
//! is why the playback commands here only log.

use std::mem;
use std::sync::Once;

use log::{debug, warn};

use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, COLORREF, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
    MONITORINFOF_PRIMARY,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::GetDpiForWindow;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, RegisterClassW, SetLayeredWindowAttributes,
    SetWindowPos, ShowWindow, CW_USEDEFAULT, LWA_ALPHA, SWP_FRAMECHANGED, SWP_NOACTIVATE,
    SWP_NOZORDER, SWP_SHOWWINDOW, SW_SHOWNOACTIVATE, WINDOW_EX_STYLE, WNDCLASSW, WS_EX_LAYERED,
    WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

use crate::events::{OverlayId, SessionEvent, SessionEventSender};
use crate::item::MediaSource;
use crate::surface::{
    CatalogError, LogicalBounds, PhysicalBounds, ScaleFactor, ScreenSurface, SurfaceCatalog,
    SurfaceId,
};
use crate::window::{BackendError, OverlayBackend, OverlayWindow, PlacementError, PlaybackCommands};

const BASE_DPI: f64 = 96.0;
const OVERLAY_CLASS: &str = "OvpOverlayWindow";

fn widestring(value: &str) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    std::ffi::OsStr::new(value).encode_wide().chain(std::iter::once(0)).collect()
}

/// Enumerates physical displays through `EnumDisplayMonitors`.
#[derive(Debug, Default)]
pub struct WindowsCatalog;

impl SurfaceCatalog for WindowsCatalog {
    fn list_surfaces(&self) -> Result<Vec<ScreenSurface>, CatalogError> {
        unsafe extern "system" fn enum_monitor(
            monitor: HMONITOR,
            _hdc: HDC,
            _rect: *mut RECT,
            data: LPARAM,
        ) -> BOOL {
            let surfaces = unsafe { &mut *(data.0 as *mut Vec<ScreenSurface>) };
            let mut info = MONITORINFOEXW::default();
            info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;
            if unsafe { GetMonitorInfoW(monitor, &mut info.monitorInfo as *mut MONITORINFO) }
                .as_bool()
            {
                let device_len =
                    info.szDevice.iter().position(|&c| c == 0).unwrap_or(info.szDevice.len());
                let rc = info.monitorInfo.rcMonitor;
                surfaces.push(ScreenSurface {
                    id: SurfaceId::new(String::from_utf16_lossy(&info.szDevice[..device_len])),
                    bounds: PhysicalBounds::new(
                        rc.left,
                        rc.top,
                        (rc.right - rc.left) as u32,
                        (rc.bottom - rc.top) as u32,
                    ),
                    is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
                });
            }
            BOOL(1)
        }

        let mut surfaces: Vec<ScreenSurface> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                None,
                None,
                Some(enum_monitor),
                LPARAM(&mut surfaces as *mut Vec<ScreenSurface> as isize),
            )
        };
        if !ok.as_bool() {
            return Err(CatalogError::Enumeration("EnumDisplayMonitors failed".to_string()));
        }
        Ok(surfaces)
    }
}

unsafe extern "system" fn overlay_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

fn overlay_ex_style() -> WINDOW_EX_STYLE {
    // WS_EX_TRANSPARENT makes the window click-through; it is part of the
    // creation style, so it is in force before the window ever shows.
    WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE
}

fn alpha_from_opacity(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Creates borderless, click-through, always-on-top layered windows.
#[derive(Debug, Default)]
pub struct WindowsOverlayBackend;

impl OverlayBackend for WindowsOverlayBackend {
    type Window = WindowsOverlayWindow;

    fn create_window(
        &mut self,
        overlay_id: OverlayId,
        events: SessionEventSender,
    ) -> Result<WindowsOverlayWindow, BackendError> {
        static REGISTER_CLASS: Once = Once::new();
        let class_name = widestring(OVERLAY_CLASS);
        let hinstance = unsafe { GetModuleHandleW(PCWSTR::null()) }
            .map_err(|err| BackendError::WindowCreation(err.to_string()))?;

        REGISTER_CLASS.call_once(|| unsafe {
            let wc = WNDCLASSW {
                hInstance: hinstance.into(),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                lpfnWndProc: Some(overlay_wndproc),
                ..Default::default()
            };
            let _ = RegisterClassW(&wc);
        });

        let hwnd = unsafe {
            CreateWindowExW(
                overlay_ex_style(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR::null(),
                WS_POPUP,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                None,
                None,
                Some(hinstance.into()),
                None,
            )
        }
        .map_err(|err| BackendError::WindowCreation(err.to_string()))?;

        if let Err(err) =
            unsafe { SetLayeredWindowAttributes(hwnd, COLORREF(0), u8::MAX, LWA_ALPHA) }
        {
            warn!("overlay {overlay_id}: initial alpha setup failed: {err}");
        }
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        }

        // The window exists and has had its first layout by the time the
        // session loop drains this event, which is when phase-two placement
        // runs.
        let _ = events.send(SessionEvent::WindowReady { overlay_id });
        Ok(WindowsOverlayWindow { overlay_id, hwnd: Some(hwnd) })
    }
}

pub struct WindowsOverlayWindow {
    overlay_id: OverlayId,
    hwnd: Option<HWND>,
}

impl PlaybackCommands for WindowsOverlayWindow {
    fn load(&mut self, source: &MediaSource) {
        debug!("overlay {}: load {source}", self.overlay_id);
    }

    fn play(&mut self) {
        debug!("overlay {}: play", self.overlay_id);
    }

    fn pause(&mut self) {
        debug!("overlay {}: pause", self.overlay_id);
    }

    fn stop(&mut self) {
        debug!("overlay {}: stop", self.overlay_id);
    }

    fn set_volume(&mut self, volume: f64) {
        debug!("overlay {}: volume {volume}", self.overlay_id);
    }

    fn set_opacity(&mut self, opacity: f64) {
        let Some(hwnd) = self.hwnd else { return };
        let alpha = alpha_from_opacity(opacity);
        if let Err(err) = unsafe { SetLayeredWindowAttributes(hwnd, COLORREF(0), alpha, LWA_ALPHA) }
        {
            warn!("overlay {}: opacity update failed: {err}", self.overlay_id);
        }
    }
}

impl OverlayWindow for WindowsOverlayWindow {
    fn place_physical(&mut self, bounds: PhysicalBounds) -> Result<(), PlacementError> {
        let Some(hwnd) = self.hwnd else {
            return Err(PlacementError::Os("window already closed".to_string()));
        };
        unsafe {
            SetWindowPos(
                hwnd,
                None,
                bounds.x,
                bounds.y,
                bounds.width as i32,
                bounds.height as i32,
                SWP_NOZORDER | SWP_NOACTIVATE | SWP_FRAMECHANGED | SWP_SHOWWINDOW,
            )
        }
        .map_err(|err| PlacementError::Os(err.to_string()))
    }

    fn scale_factor(&self) -> Option<ScaleFactor> {
        let hwnd = self.hwnd?;
        let dpi = unsafe { GetDpiForWindow(hwnd) };
        if dpi == 0 {
            return None;
        }
        Some(ScaleFactor::uniform(dpi as f64 / BASE_DPI))
    }

    fn place_logical(&mut self, bounds: LogicalBounds) {
        // Win32 window coordinates are physical pixels, and phase one has
        // already put the window there.
        debug!("overlay {}: logical placement {bounds:?} acknowledged", self.overlay_id);
    }

    fn close(&mut self) {
        if let Some(hwnd) = self.hwnd.take() {
            if let Err(err) = unsafe { DestroyWindow(hwnd) } {
                warn!("overlay {}: window destruction failed: {err}", self.overlay_id);
            }
        }
    }
}

impl Drop for WindowsOverlayWindow {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_style_is_layered_clickthrough_topmost() {
        let style = overlay_ex_style();
        assert_ne!(style.0 & WS_EX_LAYERED.0, 0);
        assert_ne!(style.0 & WS_EX_TRANSPARENT.0, 0);
        assert_ne!(style.0 & WS_EX_TOPMOST.0, 0);
        assert_ne!(style.0 & WS_EX_NOACTIVATE.0, 0);
    }

    #[test]
    fn opacity_maps_to_the_full_alpha_range() {
        assert_eq!(alpha_from_opacity(0.0), 0);
        assert_eq!(alpha_from_opacity(1.0), 255);
        assert_eq!(alpha_from_opacity(0.5), 128);
        assert_eq!(alpha_from_opacity(-2.0), 0);
        assert_eq!(alpha_from_opacity(9.0), 255);
    }
}
