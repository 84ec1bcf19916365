//! Immutable content registry: items, recipes, device templates, fuels,
//! and the service-accessor table.
//!
//! Three-phase lifecycle: register everything on a [`RegistryBuilder`],
//! then freeze with [`RegistryBuilder::build`]. Service accessors are
//! resolved once here, at startup, into a flat `(device type, service
//! kind) -> accessor` table -- lookups at runtime are direct map hits with
//! no dynamic dispatch behind them.

use crate::boost::BoostState;
use crate::container::{ResourceContainer, ResourceKind};
use crate::access::ItemPort;
use crate::device::{ports, Device};
use crate::id::{DeviceTypeId, ItemTypeId, RecipeId};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// An item type definition.
#[derive(Debug, Clone)]
pub struct ItemDef {
    pub name: String,
    /// Per-unit resource payload capacity, for chargeable items.
    pub charge_capacity: Option<u32>,
}

/// A recipe definition: one input type to one output type. Timing and cost
/// come from the tunables when a converter is built.
#[derive(Debug, Clone)]
pub struct RecipeDef {
    pub name: String,
    pub input: ItemTypeId,
    pub input_count: u32,
    pub output: ItemTypeId,
    pub output_count: u32,
}

/// Construction parameters for a device template. Numeric knobs live in
/// the tunables; the spec only pins content references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSpec {
    Converter { recipe: RecipeId, fuel_item: ItemTypeId },
    Generator { fuel_item: ItemTypeId },
    Reservoir { kind: ResourceKind },
    Conduit { kind: ResourceKind },
    Amplifier,
    Decay { yield_item: ItemTypeId },
    Locker { slots: u32 },
}

/// A device template definition.
#[derive(Debug, Clone)]
pub struct DeviceTypeDef {
    pub name: String,
    pub spec: DeviceSpec,
}

// ---------------------------------------------------------------------------
// Service accessors
// ---------------------------------------------------------------------------

/// The capabilities a neighbor can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Resource(ResourceKind),
    Items,
    Boost,
}

pub type ResourceAccessor = fn(&mut Device) -> Option<&mut ResourceContainer>;
pub type ItemAccessor = for<'a> fn(&'a mut Device) -> Option<ItemPort<'a>>;
pub type BoostAccessor = fn(&mut Device) -> Option<&mut BoostState>;

/// One row of the service table.
#[derive(Debug, Clone, Copy)]
pub enum ServiceAccessor {
    Resource(ResourceAccessor),
    Items(ItemAccessor),
    Boost(BoostAccessor),
}

fn accessor_rows(spec: &DeviceSpec) -> Vec<(ServiceKind, ServiceAccessor)> {
    use ServiceAccessor as A;
    use ServiceKind as K;
    match spec {
        DeviceSpec::Converter { .. } => vec![
            (K::Resource(ResourceKind::Charge), A::Resource(ports::charge_container)),
            (K::Items, A::Items(ports::items)),
        ],
        DeviceSpec::Generator { .. } => vec![
            (K::Resource(ResourceKind::Charge), A::Resource(ports::charge_container)),
            (K::Items, A::Items(ports::items)),
            (K::Boost, A::Boost(ports::boost)),
        ],
        DeviceSpec::Reservoir { kind } => {
            let accessor = match kind {
                ResourceKind::Charge => ports::charge_container as ResourceAccessor,
                ResourceKind::Entropy => ports::entropy_container as ResourceAccessor,
            };
            vec![
                (K::Resource(*kind), A::Resource(accessor)),
                (K::Items, A::Items(ports::items)),
            ]
        }
        DeviceSpec::Conduit { .. } | DeviceSpec::Amplifier => vec![],
        DeviceSpec::Decay { .. } | DeviceSpec::Locker { .. } => {
            vec![(K::Items, A::Items(ports::items))]
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemTypeId),
    #[error("invalid recipe reference: {0:?}")]
    InvalidRecipeRef(RecipeId),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemTypeId>,
    recipes: Vec<RecipeDef>,
    recipe_name_to_id: HashMap<String, RecipeId>,
    devices: Vec<DeviceTypeDef>,
    device_name_to_id: HashMap<String, DeviceTypeId>,
    fuels: HashMap<ItemTypeId, u32>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item type. Returns its ID.
    pub fn register_item(&mut self, name: &str, charge_capacity: Option<u32>) -> ItemTypeId {
        let id = ItemTypeId(self.items.len() as u32);
        self.items.push(ItemDef {
            name: name.to_string(),
            charge_capacity,
        });
        self.item_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a recipe. Returns its ID.
    pub fn register_recipe(
        &mut self,
        name: &str,
        input: ItemTypeId,
        input_count: u32,
        output: ItemTypeId,
        output_count: u32,
    ) -> RecipeId {
        let id = RecipeId(self.recipes.len() as u32);
        self.recipes.push(RecipeDef {
            name: name.to_string(),
            input,
            input_count: input_count.max(1),
            output,
            output_count: output_count.max(1),
        });
        self.recipe_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a device template. Returns its ID.
    pub fn register_device(&mut self, name: &str, spec: DeviceSpec) -> DeviceTypeId {
        let id = DeviceTypeId(self.devices.len() as u32);
        self.devices.push(DeviceTypeDef {
            name: name.to_string(),
            spec,
        });
        self.device_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Declare an item as fuel worth `burn_steps` per unit.
    pub fn register_fuel(&mut self, item: ItemTypeId, burn_steps: u32) {
        self.fuels.insert(item, burn_steps.max(1));
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_name_to_id.get(name).copied()
    }

    /// Validate all references and freeze into an immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let item_count = self.items.len() as u32;
        let check_item = |id: ItemTypeId| {
            if id.0 >= item_count {
                Err(RegistryError::InvalidItemRef(id))
            } else {
                Ok(())
            }
        };

        for recipe in &self.recipes {
            check_item(recipe.input)?;
            check_item(recipe.output)?;
        }
        for &item in self.fuels.keys() {
            check_item(item)?;
        }

        let mut services = HashMap::new();
        for (index, def) in self.devices.iter().enumerate() {
            match &def.spec {
                DeviceSpec::Converter { recipe, fuel_item } => {
                    if recipe.0 as usize >= self.recipes.len() {
                        return Err(RegistryError::InvalidRecipeRef(*recipe));
                    }
                    check_item(*fuel_item)?;
                }
                DeviceSpec::Generator { fuel_item } => check_item(*fuel_item)?,
                DeviceSpec::Decay { yield_item } => check_item(*yield_item)?,
                DeviceSpec::Reservoir { .. }
                | DeviceSpec::Conduit { .. }
                | DeviceSpec::Amplifier
                | DeviceSpec::Locker { .. } => {}
            }
            let type_id = DeviceTypeId(index as u32);
            for (kind, accessor) in accessor_rows(&def.spec) {
                services.insert((type_id, kind), accessor);
            }
        }

        Ok(Registry {
            items: self.items,
            item_name_to_id: self.item_name_to_id,
            recipes: self.recipes,
            recipe_name_to_id: self.recipe_name_to_id,
            devices: self.devices,
            device_name_to_id: self.device_name_to_id,
            fuels: self.fuels,
            services,
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable registry. Frozen after build.
#[derive(Debug)]
pub struct Registry {
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemTypeId>,
    recipes: Vec<RecipeDef>,
    recipe_name_to_id: HashMap<String, RecipeId>,
    devices: Vec<DeviceTypeDef>,
    device_name_to_id: HashMap<String, DeviceTypeId>,
    fuels: HashMap<ItemTypeId, u32>,
    services: HashMap<(DeviceTypeId, ServiceKind), ServiceAccessor>,
}

impl Registry {
    pub fn get_item(&self, id: ItemTypeId) -> Option<&ItemDef> {
        self.items.get(id.0 as usize)
    }

    pub fn get_recipe(&self, id: RecipeId) -> Option<&RecipeDef> {
        self.recipes.get(id.0 as usize)
    }

    pub fn get_device(&self, id: DeviceTypeId) -> Option<&DeviceTypeDef> {
        self.devices.get(id.0 as usize)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_name_to_id.get(name).copied()
    }

    pub fn device_id(&self, name: &str) -> Option<DeviceTypeId> {
        self.device_name_to_id.get(name).copied()
    }

    /// Burn steps for one unit of `item`; 0 means not a fuel.
    pub fn fuel_value(&self, item: ItemTypeId) -> u32 {
        self.fuels.get(&item).copied().unwrap_or(0)
    }

    /// Per-unit payload capacity for `item`, if it is chargeable.
    pub fn charge_capacity(&self, item: ItemTypeId) -> Option<u32> {
        self.get_item(item).and_then(|def| def.charge_capacity)
    }

    /// Resolve a resource-container accessor for a device type.
    pub fn resource_accessor(
        &self,
        device_type: DeviceTypeId,
        kind: ResourceKind,
    ) -> Option<ResourceAccessor> {
        match self.services.get(&(device_type, ServiceKind::Resource(kind))) {
            Some(ServiceAccessor::Resource(f)) => Some(*f),
            _ => None,
        }
    }

    /// Resolve an item-port accessor for a device type.
    pub fn item_accessor(&self, device_type: DeviceTypeId) -> Option<ItemAccessor> {
        match self.services.get(&(device_type, ServiceKind::Items)) {
            Some(ServiceAccessor::Items(f)) => Some(*f),
            _ => None,
        }
    }

    /// Resolve a boost-receiver accessor for a device type.
    pub fn boost_accessor(&self, device_type: DeviceTypeId) -> Option<BoostAccessor> {
        match self.services.get(&(device_type, ServiceKind::Boost)) {
            Some(ServiceAccessor::Boost(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
