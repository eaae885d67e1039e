use towerline_core::Economy;

/// Gold and lives of the single player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    gold: u32,
    lives: u32,
}

impl Player {
    /// Creates a player holding the provided purse.
    #[must_use]
    pub const fn new(gold: u32, lives: u32) -> Self {
        Self { gold, lives }
    }
}

impl Economy for Player {
    fn gold(&self) -> u32 {
        self.gold
    }

    fn spend_gold(&mut self, amount: u32) -> bool {
        match self.gold.checked_sub(amount) {
            Some(left) => {
                self.gold = left;
                true
            }
            None => false,
        }
    }

    fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    fn lives(&self) -> u32 {
        self.lives
    }

    fn spend_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }
}
