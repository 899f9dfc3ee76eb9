//! Broad phase on a uniform grid, narrow phase with SAT, then damage.
//!
//! Each entity lands in the single cell holding its position. Pairs are
//! formed within a cell and against the forward half of its neighbourhood
//! (right, down-left, down, down-right), so every adjacent pair of cells is
//! visited exactly once.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};

use anyhow::Result;

use crate::{
    components::{Damage, Faction, Health, Hitbox, Position, Projectile, WorldShape},
    ecs::{EntityId, World},
    engine::{FrameContext, System},
    geometry::{circle_polygon_collide, circles_collide, polygons_collide},
    pool::PoolManager,
    systems::is_shown,
};

const FORWARD_NEIGHBOURS: [(i64, i64); 4] = [(1, 0), (-1, 1), (0, 1), (1, 1)];

/// Damage applied during the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub attacker: EntityId,
    pub target: EntityId,
    pub amount: f64,
    /// Target health after the hit.
    pub remaining: f64,
}

#[derive(Default)]
pub struct CollisionSystem {
    contacts: Vec<(EntityId, EntityId)>,
    hits: Vec<Hit>,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every colliding pair found last frame, lower id first.
    pub fn contacts(&self) -> &[(EntityId, EntityId)] {
        &self.contacts
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }
}

fn shapes_touch(a: &WorldShape, b: &WorldShape) -> bool {
    match (a, b) {
        (
            WorldShape::Circle {
                center: ca,
                radius: ra,
            },
            WorldShape::Circle {
                center: cb,
                radius: rb,
            },
        ) => circles_collide(*ca, *ra, *cb, *rb),
        (WorldShape::Rect { vertices: va, .. }, WorldShape::Rect { vertices: vb, .. }) => {
            polygons_collide(va, vb)
        }
        (WorldShape::Circle { center, radius }, WorldShape::Rect { vertices, .. })
        | (WorldShape::Rect { vertices, .. }, WorldShape::Circle { center, radius }) => {
            circle_polygon_collide(*center, *radius, vertices)
        }
    }
}

fn entities_touch(world: &World, a: EntityId, b: EntityId) -> bool {
    let (Some(hitbox_a), Some(hitbox_b)) = (world.get::<Hitbox>(a), world.get::<Hitbox>(b))
    else {
        return false;
    };
    hitbox_a
        .world
        .iter()
        .any(|sa| hitbox_b.world.iter().any(|sb| shapes_touch(sa, sb)))
}

fn ordered(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl CollisionSystem {
    fn broad_phase(&self, ctx: &FrameContext, world: &World) -> BTreeSet<(EntityId, EntityId)> {
        let cell_size = ctx.config.collision.cell_size;
        let (columns, rows) = ctx.config.grid_extent();

        let mut grid: HashMap<(i64, i64), Vec<EntityId>> = HashMap::new();
        for id in world.with::<Hitbox>() {
            if !is_shown(world, id) {
                continue;
            }
            let has_shapes = world
                .get::<Hitbox>(id)
                .map_or(false, |hitbox| !hitbox.world.is_empty());
            let Some(pos) = world.get::<Position>(id) else {
                continue;
            };
            if !has_shapes {
                continue;
            }
            let cell = (
                (pos.x / cell_size).floor() as i64,
                (pos.y / cell_size).floor() as i64,
            );
            if cell.0 < 0 || cell.1 < 0 || cell.0 >= columns || cell.1 >= rows {
                continue;
            }
            grid.entry(cell).or_default().push(id);
        }

        let mut candidates = BTreeSet::new();
        for (&(cx, cy), members) in &grid {
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    candidates.insert(ordered(a, b));
                }
            }
            for (dx, dy) in FORWARD_NEIGHBOURS {
                let Some(others) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &a in members {
                    for &b in others {
                        candidates.insert(ordered(a, b));
                    }
                }
            }
        }
        candidates
    }

    fn resolve(&mut self, world: &mut World, pools: &mut PoolManager, a: EntityId, b: EntityId) {
        if let (Some(fa), Some(fb)) = (world.get::<Faction>(a), world.get::<Faction>(b)) {
            if fa == fb {
                return;
            }
        }

        let damage_a = world.get::<Damage>(a).map(|d| d.0);
        let damage_b = world.get::<Damage>(b).map(|d| d.0);
        let health_a = world.has::<Health>(a);
        let health_b = world.has::<Health>(b);

        match (damage_a, damage_b) {
            (Some(amount), None) if health_b => self.apply_hit(world, pools, a, b, amount),
            (None, Some(amount)) if health_a => self.apply_hit(world, pools, b, a, amount),
            (Some(_), Some(_))
                if !health_a
                    && !health_b
                    && world.has::<Projectile>(a)
                    && world.has::<Projectile>(b) =>
            {
                log::debug!("projectiles {a} and {b} cancel out");
                pools.reclaim(world, a);
                pools.reclaim(world, b);
            }
            _ => {}
        }
    }

    fn apply_hit(
        &mut self,
        world: &mut World,
        pools: &mut PoolManager,
        attacker: EntityId,
        target: EntityId,
        amount: f64,
    ) {
        let Some(health) = world.get_mut::<Health>(target) else {
            return;
        };
        health.current -= amount;
        let remaining = health.current;
        self.hits.push(Hit {
            attacker,
            target,
            amount,
            remaining,
        });

        pools.reclaim(world, attacker);
        if remaining <= 0.0 {
            log::debug!("{target} destroyed by {attacker}");
            pools.reclaim(world, target);
        }
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        pools: &mut PoolManager,
    ) -> Result<()> {
        self.contacts.clear();
        self.hits.clear();

        for (a, b) in self.broad_phase(ctx, world) {
            // an earlier pair this frame may have taken either side out of play
            if !is_shown(world, a) || !is_shown(world, b) {
                continue;
            }
            if !entities_touch(world, a, b) {
                continue;
            }
            self.contacts.push((a, b));
            self.resolve(world, pools, a, b);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
