use std::any::Any;

use anyhow::Result;

use crate::{
    components::{
        Damage, Faction, Hitbox, PlayerWeapon, Position, Projectile, Rotation, Trigger, Velocity,
    },
    ecs::{EntityId, World},
    engine::{FrameContext, System},
    geometry::rotate,
    pool::{PoolCategory, PoolManager},
    systems::is_active,
};

/// Turns a pulled trigger into a volley of pooled bullets, one per muzzle.
pub struct WeaponSystem;

impl WeaponSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WeaponSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn fire(world: &mut World, pools: &mut PoolManager, shooter: EntityId, weapon: &PlayerWeapon) {
    let Some(origin) = world.get::<Position>(shooter).copied() else {
        return;
    };
    let angle = world.get::<Rotation>(shooter).map_or(0.0, |r| r.angle);
    let faction = world.get::<Faction>(shooter).copied();
    let (vx, vy) = rotate((0.0, -weapon.speed), angle);

    for (index, &muzzle) in weapon.muzzles.iter().enumerate() {
        let Some(bullet) = pools.acquire(world, PoolCategory::Bullet) else {
            log::debug!(
                "{shooter}: bullet pool empty, dropped {} of {} shots",
                weapon.muzzles.len() - index,
                weapon.muzzles.len()
            );
            break;
        };
        let (mx, my) = rotate(muzzle, angle);
        world.set(bullet, Position::new(origin.x + mx, origin.y + my));
        world.set(bullet, Velocity::new(vx, vy));
        world.set(
            bullet,
            Rotation {
                angle,
                angular_speed: 0.0,
            },
        );
        world.set(bullet, Damage(weapon.damage));
        world.set(bullet, Hitbox::new(weapon.projectile.hitbox.clone()));
        world.set(bullet, weapon.projectile.sprite.clone());
        world.set(bullet, Projectile);
        if let Some(faction) = faction {
            world.set(bullet, faction);
        }
    }
}

impl System for WeaponSystem {
    fn name(&self) -> &'static str {
        "weapon"
    }

    fn run(
        &mut self,
        ctx: &FrameContext,
        world: &mut World,
        pools: &mut PoolManager,
    ) -> Result<()> {
        for id in world.with::<PlayerWeapon>() {
            if !is_active(world, id) {
                continue;
            }
            let pulled = world.get::<Trigger>(id).map_or(false, |t| t.pulled);
            let Some(weapon) = world.get_mut::<PlayerWeapon>(id) else {
                continue;
            };
            weapon.cooldown = (weapon.cooldown - ctx.dt).max(0.0);
            if !pulled || weapon.cooldown > 0.0 {
                continue;
            }
            weapon.cooldown = weapon.fire_interval;
            let weapon = weapon.clone();
            fire(world, pools, id, &weapon);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
