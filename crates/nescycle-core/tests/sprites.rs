mod common;

use anyhow::{Result, ensure};
use common::{BACKDROP, Fixture};
use nescycle_core::{memory::ppu::Register, ppu::Status};
use rand::{Rng, SeedableRng, rngs::StdRng};

const SPRITE_COLOR: u8 = 0x2A;

/// Solid background on the whole first nametable plus a solid sprite tile.
fn solid_scene() -> Fixture {
    let mut f = Fixture::new();
    f.solid_tile(0x0000, 1, 0xFF, 0x00);
    f.write_vram(0x3F01, &[0x16]);
    f.write_vram(0x3F11, &[SPRITE_COLOR]);
    f.write_vram(0x2000, &[1; 960]);
    f
}

#[test]
fn sprite_zero_hit_reports_first_overlap() -> Result<()> {
    let mut f = solid_scene();
    f.load_sprites(&[[20, 1, 0, 10]]);
    f.scroll(0, 0);
    f.write(Register::Mask, 0x1E);
    f.run_frame();

    ensure!(f.ppu.status().contains(Status::SPRITE_ZERO_HIT));
    let hit = f.ppu.sprite0_hit_debug().expect("sprite 0 hit recorded");
    ensure!(hit.pos.scanline == 21, "hit on scanline {}", hit.pos.scanline);
    ensure!(hit.pos.x == 10, "hit at x {}", hit.pos.x);
    ensure!(hit.pos.dot == 12, "hit at dot {}", hit.pos.dot);
    ensure!(hit.oam == [20, 1, 0, 10]);
    f.expect_pixel(10, 21, SPRITE_COLOR)?;
    f.expect_pixel(9, 21, 0x16)?;
    Ok(())
}

#[test]
fn sprite_zero_hit_never_fires_at_last_column() {
    let mut f = solid_scene();
    f.load_sprites(&[[20, 1, 0, 255]]);
    f.scroll(0, 0);
    f.write(Register::Mask, 0x1E);
    f.run_frame();
    f.run_frame();

    assert!(!f.ppu.status().contains(Status::SPRITE_ZERO_HIT));
    assert!(f.ppu.sprite0_hit_debug().is_none());
    // The sprite pixel itself is still drawn.
    assert_eq!(f.pixel(255, 21), SPRITE_COLOR);
}

#[test]
fn left_clipping_delays_sprite_zero_hit() {
    let mut f = solid_scene();
    f.load_sprites(&[[40, 1, 0, 4]]);
    f.scroll(0, 0);
    f.write(Register::Mask, 0x18);
    f.run_frame();

    let hit = f.ppu.sprite0_hit_debug().expect("sprite 0 hit recorded");
    assert_eq!((hit.pos.scanline, hit.pos.x), (41, 8));
    assert_eq!(f.pixel(4, 41), BACKDROP);
}

#[test]
fn only_sprite_zero_triggers_the_hit() {
    let mut f = solid_scene();
    f.load_sprites(&[[200, 1, 0, 10], [20, 1, 0, 10]]);
    f.scroll(0, 0);
    f.write(Register::Mask, 0x1E);
    f.run_to(199, 0);
    assert!(!f.ppu.status().contains(Status::SPRITE_ZERO_HIT));
    f.run_frame();
    let hit = f.ppu.sprite0_hit_debug().expect("sprite 0 hit recorded");
    assert_eq!(hit.pos.scanline, 201);
}

#[test]
fn behind_background_sprite_only_shows_through_transparent_pixels() -> Result<()> {
    let mut f = Fixture::new();
    // Background tile with only the left half opaque.
    f.solid_tile(0x0000, 1, 0xF0, 0x00);
    f.solid_tile(0x0000, 2, 0xFF, 0x00);
    f.write_vram(0x3F01, &[0x16]);
    f.write_vram(0x3F11, &[SPRITE_COLOR]);
    f.write_vram(0x2000 + 4 * 32, &[1; 32]);
    f.load_sprites(&[[0xF0, 2, 0, 0], [31, 2, 0x20, 0]]);
    f.scroll(0, 0);
    f.write(Register::Mask, 0x1E);
    f.run_frame();
    f.run_frame();

    f.expect_pixel(3, 33, 0x16)?;
    f.expect_pixel(5, 33, SPRITE_COLOR)?;
    Ok(())
}

#[test]
fn flips_mirror_the_pattern() -> Result<()> {
    let mut f = Fixture::new();
    // Tile 3: only the leftmost column and top row are set.
    f.write_vram(0x0030, &[0xFF, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80]);
    f.write_vram(0x3F11, &[SPRITE_COLOR]);
    f.load_sprites(&[
        [0xF0, 0, 0, 0],
        [10, 3, 0x00, 100],
        [10, 3, 0x40, 120],
        [10, 3, 0x80, 140],
    ]);
    f.scroll(0, 0);
    f.write(Register::Mask, 0x14);
    f.run_frame();
    f.run_frame();

    // Unflipped: top-left corner set, bottom-right clear.
    f.expect_pixel(100, 18, SPRITE_COLOR)?;
    f.expect_pixel(107, 18, BACKDROP)?;
    f.expect_pixel(100, 11, SPRITE_COLOR)?;
    f.expect_pixel(107, 11, SPRITE_COLOR)?;
    // Horizontal flip moves the column to the right edge.
    f.expect_pixel(127, 18, SPRITE_COLOR)?;
    f.expect_pixel(120, 18, BACKDROP)?;
    // Vertical flip moves the row to the bottom.
    f.expect_pixel(147, 18, SPRITE_COLOR)?;
    f.expect_pixel(147, 11, BACKDROP)?;
    Ok(())
}

#[test]
fn tall_sprites_take_table_from_tile_bit() -> Result<()> {
    let mut f = Fixture::new();
    f.solid_tile(0x1000, 2, 0xFF, 0x00);
    f.solid_tile(0x1000, 3, 0x00, 0xFF);
    f.write_vram(0x3F11, &[0x11, 0x12]);
    f.load_sprites(&[[0xF0, 0, 0, 0], [50, 3, 0, 40]]);
    f.scroll(0, 0);
    f.write(Register::Control, 0x20);
    f.write(Register::Mask, 0x14);
    f.run_frame();
    f.run_frame();

    f.expect_pixel(40, 51, 0x11)?;
    f.expect_pixel(47, 58, 0x11)?;
    f.expect_pixel(40, 59, 0x12)?;
    f.expect_pixel(40, 66, 0x12)?;
    f.expect_pixel(40, 67, BACKDROP)?;
    Ok(())
}

#[test]
fn ninth_sprite_on_a_line_sets_overflow() {
    let mut f = Fixture::new();
    let mut sprites = vec![[0xF0, 0, 0, 0]];
    sprites.extend((0..9).map(|i| [100, 0, 0, i * 10]));
    f.load_sprites(&sprites);
    f.write(Register::Mask, 0x10);
    f.run_to(100, 0);
    assert!(!f.ppu.status().contains(Status::SPRITE_OVERFLOW));
    f.run_to(101, 0);
    assert!(f.ppu.status().contains(Status::SPRITE_OVERFLOW));
}

#[test]
fn eight_sprites_fit_on_a_line() {
    let mut f = Fixture::new();
    f.solid_tile(0x0000, 1, 0xFF, 0x00);
    f.write_vram(0x3F11, &[SPRITE_COLOR]);
    // Non-Y bytes stay outside every scanline's range.
    let sprites: Vec<_> = (0..8).map(|_| [100, 0xFF, 0xFF, 0xFF]).collect();
    f.load_sprites(&sprites);
    f.write(Register::Mask, 0x10);
    f.run_frame();
    f.run_frame();
    assert!(!f.ppu.status().contains(Status::SPRITE_OVERFLOW));
}

#[test]
fn random_sprite_layouts_render_every_sprite() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5EED_2C02);
    for round in 0..8 {
        let mut f = Fixture::new();
        f.solid_tile(0x0000, 1, 0xFF, 0x00);
        f.write_vram(0x3F11, &[SPRITE_COLOR]);

        // Keep every line at seven sprites or fewer so the overflow walk never starts.
        let mut per_line = [0u8; 256];
        let mut sprites = Vec::new();
        for _ in 0..64 {
            let y: u8 = rng.random_range(0..239);
            let x: u8 = rng.random();
            let lines = y as usize..(y as usize + 8).min(240);
            if per_line[lines.clone()].iter().any(|&count| count >= 7) {
                sprites.push([0xF0, 0, 0, 0]);
                continue;
            }
            per_line[lines].iter_mut().for_each(|count| *count += 1);
            sprites.push([y, 1, 0, x]);
        }
        f.load_sprites(&sprites);
        f.write(Register::Mask, 0x14);
        f.run_frame();
        f.run_frame();

        ensure!(
            !f.ppu.status().contains(Status::SPRITE_OVERFLOW),
            "round {round}: unexpected overflow"
        );
        for &[y, tile, _, x] in &sprites {
            if tile == 1 {
                f.expect_pixel(x as usize, y as usize + 1, SPRITE_COLOR)?;
            }
        }
    }
    Ok(())
}
