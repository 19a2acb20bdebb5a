//! Caption panel placement and its UI sink.
//!
//! Placement is a pure function from pointer position to panel corner so the
//! overflow policy is testable; the actual node write is a thin sink system.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::constants::interaction::{CAPTION_OFFSET, CAPTION_PANEL_SIZE};

/// What the caption panel should show this tick. Written by the hover
/// arbiter, applied by the sink below.
#[derive(Resource, Debug, Clone, Default)]
pub struct CaptionPanelState {
    pub visible: bool,
    pub surface_name: String,
    pub caption: String,
    pub pointer: Vec2,
}

impl CaptionPanelState {
    pub fn show(&mut self, surface_name: String, caption: String, pointer: Vec2) {
        self.visible = true;
        self.surface_name = surface_name;
        self.caption = caption;
        self.pointer = pointer;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Panel corner for a pointer position: offset from the pointer, mirrored to
/// the pointer's other side when it would overflow the viewport, and clamped
/// to the edge as a last resort.
pub fn place_panel(pointer: Vec2, viewport: Vec2, panel_size: Vec2, offset: Vec2) -> Vec2 {
    let mut x = pointer.x + offset.x;
    if x + panel_size.x > viewport.x {
        x = pointer.x - offset.x - panel_size.x;
    }
    let mut y = pointer.y + offset.y;
    if y + panel_size.y > viewport.y {
        y = pointer.y - offset.y - panel_size.y;
    }

    Vec2::new(
        x.clamp(0.0, (viewport.x - panel_size.x).max(0.0)),
        y.clamp(0.0, (viewport.y - panel_size.y).max(0.0)),
    )
}

#[derive(Component)]
pub struct CaptionPanel;

#[derive(Component)]
pub struct CaptionTitle;

#[derive(Component)]
pub struct CaptionBody;

pub fn spawn_caption_panel(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                width: Val::Px(CAPTION_PANEL_SIZE.x),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                padding: UiRect::all(Val::Px(10.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.04, 0.05, 0.08, 0.85)),
            Visibility::Hidden,
            CaptionPanel,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                CaptionTitle,
            ));
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgb(0.75, 0.78, 0.85)),
                CaptionBody,
            ));
        });
}

/// Apply the computed placement to the UI node.
pub fn apply_caption_panel(
    state: Res<CaptionPanelState>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut panels: Query<(&mut Node, &mut Visibility), With<CaptionPanel>>,
    mut titles: Query<&mut Text, (With<CaptionTitle>, Without<CaptionBody>)>,
    mut bodies: Query<&mut Text, (With<CaptionBody>, Without<CaptionTitle>)>,
) {
    let Ok((mut node, mut visibility)) = panels.single_mut() else {
        return;
    };

    if !state.visible {
        *visibility = Visibility::Hidden;
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let viewport = Vec2::new(window.width(), window.height());
    let corner = place_panel(state.pointer, viewport, CAPTION_PANEL_SIZE, CAPTION_OFFSET);

    node.left = Val::Px(corner.x);
    node.top = Val::Px(corner.y);
    *visibility = Visibility::Visible;

    if let Ok(mut title) = titles.single_mut() {
        title.0 = state.surface_name.clone();
    }
    if let Ok(mut body) = bodies.single_mut() {
        body.0 = state.caption.clone();
    }
}

/// Keep the hosting page's overlay in step with the caption panel. Only
/// visibility and surface changes are forwarded, not every reposition.
pub fn notify_caption_state(
    state: Res<CaptionPanelState>,
    mut rpc: ResMut<crate::rpc::web_rpc::WebRpcInterface>,
    mut last: Local<(bool, String)>,
) {
    let current = (state.visible, state.surface_name.clone());
    if current == *last {
        return;
    }
    *last = current;
    rpc.send_notification(
        "caption_state",
        serde_json::json!({
            "visible": state.visible,
            "surface": state.surface_name,
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);
    const PANEL: Vec2 = Vec2::new(260.0, 72.0);
    const OFFSET: Vec2 = Vec2::new(18.0, 14.0);

    #[test]
    fn panel_sits_below_right_of_the_pointer() {
        let corner = place_panel(Vec2::new(100.0, 100.0), VIEWPORT, PANEL, OFFSET);
        assert_eq!(corner, Vec2::new(118.0, 114.0));
    }

    #[test]
    fn overflow_on_the_right_flips_to_the_left() {
        let corner = place_panel(Vec2::new(1200.0, 100.0), VIEWPORT, PANEL, OFFSET);
        assert_eq!(corner.x, 1200.0 - 18.0 - 260.0);
        assert_eq!(corner.y, 114.0);
    }

    #[test]
    fn overflow_on_the_bottom_flips_upward() {
        let corner = place_panel(Vec2::new(100.0, 700.0), VIEWPORT, PANEL, OFFSET);
        assert_eq!(corner.x, 118.0);
        assert_eq!(corner.y, 700.0 - 14.0 - 72.0);
    }

    #[test]
    fn corner_pointer_clamps_to_the_edges() {
        // Top-left: flipping would leave the viewport, so clamp wins.
        let corner = place_panel(Vec2::ZERO, PANEL + Vec2::splat(10.0), PANEL, OFFSET);
        assert_eq!(corner, Vec2::ZERO);
    }

    #[test]
    fn panel_never_extends_past_the_viewport() {
        for x in [0.0, 320.0, 640.0, 1270.0] {
            for y in [0.0, 180.0, 360.0, 715.0] {
                let corner = place_panel(Vec2::new(x, y), VIEWPORT, PANEL, OFFSET);
                assert!(corner.x >= 0.0 && corner.x + PANEL.x <= VIEWPORT.x);
                assert!(corner.y >= 0.0 && corner.y + PANEL.y <= VIEWPORT.y);
            }
        }
    }
}
