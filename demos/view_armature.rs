use dragon_bones_runtime::{Factory, MacroquadBackend};
use macroquad::miniquad::KeyCode;
use macroquad::prelude::*;

#[macroquad::main("view armature")]
async fn main() {
    let skeleton_bytes = include_bytes!("../src/test_assets/hero_ske.json");
    let atlas_bytes = include_bytes!("../src/test_assets/hero_tex.json");

    let mut factory = Factory::new(Box::new(MacroquadBackend));
    factory.parse_skeleton_data(skeleton_bytes, None, 1.0).unwrap();
    let placeholder = Texture2D::from_rgba8(1, 1, &[255, 255, 255, 255]);
    factory
        .parse_texture_atlas_data(atlas_bytes, Some(Box::new(placeholder)), None, 0.0)
        .unwrap();

    let mut armature = factory.build_armature("hero", None, None, None).unwrap();
    armature.enable_frame_cache(30.0);
    armature.animation_mut().play(Some("idle"), -1);

    loop {
        clear_background(Color::new(0.01, 0.0, 0.05, 1.0));

        const SCALE: f32 = 2.0;
        let screen_center_x = screen_width() / 2.0;
        let screen_center_y = screen_height() / 2.0 + 60.0;

        if is_key_pressed(KeyCode::Key1) {
            armature.animation_mut().play(Some("idle"), -1);
        } else if is_key_pressed(KeyCode::Key2) {
            armature.animation_mut().play(Some("attack"), 1);
        }
        armature.advance_time(get_frame_time());

        for bone in armature.bones() {
            let (x, y) = bone.world_position();
            let length = bone.bone_data().map_or(0.0, |data| data.length);
            let global = bone.global_transform();
            let (tip_x, tip_y) = (x + global[(0, 0)] * length, y + global[(1, 0)] * length);

            draw_line(
                screen_center_x + x * SCALE,
                screen_center_y + y * SCALE,
                screen_center_x + tip_x * SCALE,
                screen_center_y + tip_y * SCALE,
                2.0,
                YELLOW,
            );
            draw_circle(screen_center_x + x * SCALE, screen_center_y + y * SCALE, 3.0, RED);
        }

        let state = armature.animation().state();
        let caption = state.map_or_else(
            || "stopped".to_string(),
            |state| format!("{} {:.2}s", state.name, state.current_time()),
        );
        draw_text(&caption, 10.0, 20.0, 20.0, WHITE);
        next_frame().await;
    }
}
