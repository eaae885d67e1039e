use std::cmp::Ordering;

use towerline_core::{EntityId, TileCoord};

use crate::{
    pieces::{Behavior, Monster, Piece, Tower},
    vision::Sight,
};

/// Live pieces ordered by identifier.
///
/// Slots may be vacated temporarily while their piece acts; lookups skip
/// vacant slots.
#[derive(Debug, Default)]
pub(crate) struct Population {
    ids: Vec<EntityId>,
    slots: Vec<Option<Piece>>,
}

impl Population {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn insert(&mut self, piece: Piece) {
        let id = piece.id();
        let index = self.ids.partition_point(|held| *held < id);
        self.ids.insert(index, id);
        self.slots.insert(index, Some(piece));
    }

    pub(crate) fn extend(&mut self, pieces: impl IntoIterator<Item = Piece>) {
        for piece in pieces {
            self.insert(piece);
        }
    }

    /// Vacates a slot so its piece can act with mutable access to the rest.
    pub(crate) fn take(&mut self, index: usize) -> Option<Piece> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub(crate) fn restore(&mut self, index: usize, piece: Piece) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(piece);
        }
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Piece> {
        let index = self.ids.binary_search(&id).ok()?;
        self.slots.get(index)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Piece> {
        let index = self.ids.binary_search(&id).ok()?;
        self.slots.get_mut(index)?.as_mut()
    }

    pub(crate) fn monster(&self, id: EntityId) -> Option<&Monster> {
        self.get(id).and_then(Piece::as_monster)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.slots.iter().flatten()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.slots.iter_mut().flatten()
    }

    pub(crate) fn monsters_mut(&mut self) -> impl Iterator<Item = &mut Monster> {
        self.iter_mut()
            .filter(|piece| piece.is_alive())
            .filter_map(Piece::as_monster_mut)
    }

    pub(crate) fn towers_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.iter_mut()
            .filter(|piece| piece.is_alive())
            .filter_map(Piece::as_tower_mut)
    }

    /// Live monsters inside the visible area.
    pub(crate) fn monsters_in_mut<'s>(&'s mut self, sight: &'s Sight) -> impl Iterator<Item = &'s mut Monster> {
        self.monsters_mut()
            .filter(move |monster| sight.sees(monster.position()))
    }

    /// Live shooting towers inside the visible area.
    pub(crate) fn towers_in_mut<'s>(&'s mut self, sight: &'s Sight) -> impl Iterator<Item = &'s mut Tower> {
        self.towers_mut()
            .filter(move |tower| sight.sees(tower.position()))
    }

    /// Every piece inside the visible area, nearest first and ties by id.
    pub(crate) fn visible(&self, sight: &Sight) -> Vec<EntityId> {
        let mut seen: Vec<(f32, EntityId)> = self
            .iter()
            .filter(|piece| sight.sees(piece.position()))
            .map(|piece| (piece.position().distance(sight.origin), piece.id()))
            .collect();
        seen.sort_by(nearest_first);
        seen.into_iter().map(|(_, id)| id).collect()
    }

    /// Nearest live monster inside the visible area, ties broken by id.
    pub(crate) fn nearest_monster(&self, sight: &Sight) -> Option<EntityId> {
        self.iter()
            .filter(|piece| piece.is_alive())
            .filter_map(Piece::as_monster)
            .filter(|monster| sight.sees(monster.position()))
            .map(|monster| (monster.position().distance(sight.origin), monster.id()))
            .min_by(nearest_first)
            .map(|(_, id)| id)
    }

    /// Live shooting or support tower standing on a tile.
    pub(crate) fn tower_at(&self, tile: TileCoord) -> Option<EntityId> {
        self.iter()
            .filter(|piece| piece.is_alive())
            .find(|piece| piece.tower_info().is_some_and(|(held, _)| held == tile))
            .map(Piece::id)
    }

    /// Removes dead pieces and hands them back in id order.
    pub(crate) fn reap(&mut self) -> Vec<Piece> {
        let mut removed = Vec::new();
        let mut ids = Vec::with_capacity(self.ids.len());
        let mut slots = Vec::with_capacity(self.slots.len());
        for (id, slot) in self.ids.drain(..).zip(self.slots.drain(..)) {
            let Some(piece) = slot else {
                continue;
            };
            if piece.is_alive() {
                ids.push(id);
                slots.push(Some(piece));
            } else {
                removed.push(piece);
            }
        }
        self.ids = ids;
        self.slots = slots;
        removed
    }
}

fn nearest_first(a: &(f32, EntityId), b: &(f32, EntityId)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use towerline_core::ImageHandle;

    use super::*;
    use crate::{pieces::Wall, vision::VisionCone};

    fn wall(id: u32, x: f32) -> Piece {
        Piece::Wall(Wall::new(
            EntityId::new(id),
            TileCoord::new(0, 0),
            Vec2::new(x, 0.0),
            ImageHandle::PLACEHOLDER,
        ))
    }

    #[test]
    fn insertion_keeps_identifier_order() {
        let mut population = Population::default();
        population.insert(wall(5, 0.0));
        population.insert(wall(2, 0.0));
        population.extend([wall(9, 0.0), wall(3, 0.0)]);

        let ids: Vec<u32> = population.iter().map(|piece| piece.id().get()).collect();
        assert_eq!(ids, vec![2, 3, 5, 9]);
        assert!(population.get(EntityId::new(5)).is_some());
        assert!(population.get(EntityId::new(4)).is_none());
    }

    #[test]
    fn vacated_slots_are_invisible_until_restored() {
        let mut population = Population::default();
        population.extend([wall(1, 0.0), wall(2, 0.0)]);

        let piece = population.take(0).expect("piece");
        assert!(population.get(EntityId::new(1)).is_none());
        assert_eq!(population.iter().count(), 1);
        population.restore(0, piece);
        assert!(population.get(EntityId::new(1)).is_some());
    }

    #[test]
    fn visible_pieces_are_sorted_by_distance_then_id() {
        let mut population = Population::default();
        population.extend([wall(1, 30.0), wall(2, -10.0), wall(3, 10.0), wall(4, 80.0)]);
        let sight = Sight {
            origin: Vec2::ZERO,
            facing: None,
            cone: VisionCone::circle(50.0),
        };

        let ids: Vec<u32> = population.visible(&sight).iter().map(EntityId::get).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
