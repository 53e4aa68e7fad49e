//! Runtime layer tags

use serde::{Deserialize, Serialize};

/// Which layer of the actor hierarchy an object was built at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Entity,
    Actor,
    PhysicsActor,
    RenderActor,
    GameCharacter,
}

impl TypeTag {
    pub const ALL: [TypeTag; 5] = [
        TypeTag::Entity,
        TypeTag::Actor,
        TypeTag::PhysicsActor,
        TypeTag::RenderActor,
        TypeTag::GameCharacter,
    ];

    /// The layer this one specialises
    pub fn parent(self) -> Option<TypeTag> {
        match self {
            TypeTag::Entity => None,
            TypeTag::Actor => Some(TypeTag::Entity),
            TypeTag::PhysicsActor => Some(TypeTag::Actor),
            TypeTag::RenderActor => Some(TypeTag::PhysicsActor),
            TypeTag::GameCharacter => Some(TypeTag::RenderActor),
        }
    }

    /// True if `self` is `other` or specialises it
    pub fn is_a(self, other: TypeTag) -> bool {
        let mut tag = Some(self);
        while let Some(t) = tag {
            if t == other {
                return true;
            }
            tag = t.parent();
        }
        false
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Entity => "Entity",
            TypeTag::Actor => "Actor",
            TypeTag::PhysicsActor => "PhysicsActor",
            TypeTag::RenderActor => "RenderActor",
            TypeTag::GameCharacter => "GameCharacter",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_layer_is_an_entity() {
        for tag in TypeTag::ALL {
            assert!(tag.is_a(TypeTag::Entity));
            assert!(tag.is_a(tag));
        }
    }

    #[test]
    fn test_is_a_only_goes_up() {
        assert!(TypeTag::GameCharacter.is_a(TypeTag::PhysicsActor));
        assert!(!TypeTag::Actor.is_a(TypeTag::GameCharacter));
        assert!(!TypeTag::Entity.is_a(TypeTag::Actor));
    }
}
