//! End credits
//!
//! One page at a time: fade in, hold, fade out, next page. The main menu
//! follows the last page.

use super::centered_x;
use crate::error::GameError;
use crate::game::{GameContext, Mode, ModeId, ModeStatus};
use crate::render::{Color, Frame};
use crate::timer::Timer;
use log::debug;

const PAGE_FADE_STEP: i32 = 5;
const PAGE_DWELL_MS: u64 = 4500;
const TEXT_SIZE: u32 = 22;

pub const CREDIT_PAGES: &[&[&str]] = &[
    &["THE STOLEN CROWN", "A Fantasy RPG"],
    &["PROGRAMMING AND GAME DESIGN", "Justin Armstrong"],
    &[
        "ART",
        "JPhilipp",
        "Reemax",
        "Lanea Zimmerman",
        "Redshrike",
        "StumpyStrust",
        "Benjamin Larsson",
        "russpuppy",
        "hc",
        "Iron Star Media",
    ],
    &[
        "MUSIC",
        "Telaron: The King's Theme",
        "Mekathratos: Forest Dance (Town Theme)",
        "bart: Adventure Begins (Overworld Theme)",
        "8th Mode Music: High Action (Battle Theme)",
        "Arron Krogh: Coastal Town (Shop Theme)",
        "Arron Krogh: My Enemy (Dungeon Theme)",
        "Matthew Pablo: Enchanted Festival (Victory Theme)",
        "Matthew Pablo: Pleasant Creek (Brother Theme)",
    ],
    &[
        "SOUND EFFECTS",
        "Kenney",
        "Nic3_one",
        "Ekokubza123",
        "kuzyaburst",
        "audione",
    ],
    &["SPECIAL THANKS", "/r/pygame", "Leif Theden", "Stacey Hunniford"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    FadeIn,
    Hold,
    FadeOut,
}

pub struct CreditsMode {
    status: ModeStatus,
    page: usize,
    page_state: PageState,
    alpha: i32,
    timer: Timer,
}

impl CreditsMode {
    pub fn new() -> Self {
        CreditsMode {
            status: ModeStatus::default(),
            page: 0,
            page_state: PageState::FadeIn,
            alpha: 0,
            timer: Timer::new(PAGE_DWELL_MS, 0),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_state(&self) -> PageState {
        self.page_state
    }

    fn next_page(&mut self) {
        if self.page + 1 < CREDIT_PAGES.len() {
            self.page += 1;
            debug!("credits page {}", self.page);
        } else {
            self.status.finish(ModeId::MainMenu);
        }
        self.page_state = PageState::FadeIn;
    }
}

impl Default for CreditsMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for CreditsMode {
    fn id(&self) -> ModeId {
        ModeId::Credits
    }

    fn status(&self) -> &ModeStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut ModeStatus {
        &mut self.status
    }

    fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        ctx.mixer.set_level_song(ModeId::Credits, None);
        self.status.next = Some(ModeId::MainMenu);
        self.page = 0;
        self.page_state = PageState::FadeIn;
        self.alpha = 0;
        self.timer = Timer::new(PAGE_DWELL_MS, ctx.now());
        Ok(())
    }

    fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        let now = ctx.now();
        match self.page_state {
            PageState::FadeIn => {
                self.alpha += PAGE_FADE_STEP;
                if self.alpha >= 255 {
                    self.alpha = 255;
                    self.page_state = PageState::Hold;
                    self.timer.reset(now);
                }
            }
            PageState::Hold => {
                if self.timer.done(now) {
                    self.page_state = PageState::FadeOut;
                }
            }
            PageState::FadeOut => {
                self.alpha -= PAGE_FADE_STEP;
                if self.alpha <= 0 {
                    self.alpha = 0;
                    self.next_page();
                }
            }
        }
        Ok(())
    }

    fn draw(&self, ctx: &GameContext, frame: &mut Frame) {
        frame.fill(Color::rgb(0, 0, 30));
        let center = ctx.screen.0 / 2;
        let color = Color::WHITE.with_alpha(self.alpha.clamp(0, 255) as u8);
        for (i, line) in CREDIT_PAGES[self.page].iter().enumerate() {
            let x = centered_x(line, TEXT_SIZE, center);
            frame.text(*line, x, 100 + i as i32 * 40, TEXT_SIZE, color);
        }
    }
}
