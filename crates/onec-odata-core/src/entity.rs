//! Localized metadata paths and their wire names.
//!
//! Callers address collections the way the 1C configurator shows them,
//! `Справочник/Номенклатура`. The standard OData interface publishes the
//! same collection as `Catalog_Номенклатура`. Only the category is
//! translated; the object name is passed through untouched.

use std::fmt;

/// Metadata object category published by the standard OData interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Справочник
    Catalog,
    /// Документ
    Document,
    /// Журнал документов
    DocumentJournal,
    /// Константа
    Constant,
    /// План обмена
    ExchangePlan,
    /// План счетов
    ChartOfAccounts,
    /// План видов расчета
    ChartOfCalculationTypes,
    /// План видов характеристик
    ChartOfCharacteristicTypes,
    /// Регистр сведений
    InformationRegister,
    /// Регистр накопления
    AccumulationRegister,
    /// Регистр расчета
    CalculationRegister,
    /// Регистр бухгалтерии
    AccountingRegister,
    /// Бизнес-процесс
    BusinessProcess,
    /// Задача
    Task,
    /// Перечисления
    Enum,
}

impl Category {
    /// Every category, in table order.
    pub const ALL: [Self; 15] = [
        Self::Catalog,
        Self::Document,
        Self::DocumentJournal,
        Self::Constant,
        Self::ExchangePlan,
        Self::ChartOfAccounts,
        Self::ChartOfCalculationTypes,
        Self::ChartOfCharacteristicTypes,
        Self::InformationRegister,
        Self::AccumulationRegister,
        Self::CalculationRegister,
        Self::AccountingRegister,
        Self::BusinessProcess,
        Self::Task,
        Self::Enum,
    ];

    /// Localized label used in caller-facing paths.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Catalog => "Справочник",
            Self::Document => "Документ",
            Self::DocumentJournal => "Журнал документов",
            Self::Constant => "Константа",
            Self::ExchangePlan => "План обмена",
            Self::ChartOfAccounts => "План счетов",
            Self::ChartOfCalculationTypes => "План видов расчета",
            Self::ChartOfCharacteristicTypes => "План видов характеристик",
            Self::InformationRegister => "Регистр сведений",
            Self::AccumulationRegister => "Регистр накопления",
            Self::CalculationRegister => "Регистр расчета",
            Self::AccountingRegister => "Регистр бухгалтерии",
            Self::BusinessProcess => "Бизнес-процесс",
            Self::Task => "Задача",
            Self::Enum => "Перечисления",
        }
    }

    /// Prefix of the published entity set name.
    #[must_use]
    pub const fn wire_prefix(self) -> &'static str {
        match self {
            Self::Catalog => "Catalog",
            Self::Document => "Document",
            Self::DocumentJournal => "DocumentJournal",
            Self::Constant => "Constant",
            Self::ExchangePlan => "ExchangePlan",
            Self::ChartOfAccounts => "ChartOfAccounts",
            Self::ChartOfCalculationTypes => "ChartOfCalculationTypes",
            Self::ChartOfCharacteristicTypes => "ChartOfCharacteristicTypes",
            Self::InformationRegister => "InformationRegisters",
            Self::AccumulationRegister => "AccumulationRegister",
            Self::CalculationRegister => "CalculationRegister",
            Self::AccountingRegister => "AccountingRegister",
            Self::BusinessProcess => "BusinessProcess",
            Self::Task => "Task",
            Self::Enum => "Enum",
        }
    }

    /// Look up a category by its exact localized label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// A resolved entity collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName {
    category: Category,
    object: String,
}

impl EntityName {
    /// Category of the collection.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Object name as written in the configuration.
    #[must_use]
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Name of the entity set on the wire, `Prefix_Object`.
    #[must_use]
    pub fn wire_name(&self) -> String {
        format!("{}_{}", self.category.wire_prefix(), self.object)
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category.wire_prefix(), self.object)
    }
}

/// Resolve a `Category/Object` path into its wire name.
///
/// The path is split on the first `/`; everything after it is the object
/// name.
///
/// # Errors
///
/// Returns [`EntityPathError`] if the separator is missing, the object name
/// is empty, or the category is not one of the fifteen known labels.
///
/// # Examples
///
/// ```
/// use onec_odata_core::resolve;
///
/// let name = resolve("Документ/ПоступлениеТоваров").unwrap();
/// assert_eq!(name.wire_name(), "Document_ПоступлениеТоваров");
/// assert!(resolve("Каталог/Номенклатура").is_err());
/// ```
pub fn resolve(path: &str) -> Result<EntityName, EntityPathError> {
    let (label, object) = path
        .split_once('/')
        .ok_or_else(|| EntityPathError::MissingSeparator(path.to_string()))?;

    if object.is_empty() {
        return Err(EntityPathError::EmptyEntityName(path.to_string()));
    }

    let category = Category::from_label(label)
        .ok_or_else(|| EntityPathError::UnknownCategory(label.to_string()))?;

    Ok(EntityName {
        category,
        object: object.to_string(),
    })
}

/// Errors that can occur while resolving an entity path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityPathError {
    /// No `/` between category and object name
    #[error("invalid entity path {0:?}: expected \"Category/Name\"")]
    MissingSeparator(String),
    /// Nothing after the `/`
    #[error("invalid entity path {0:?}: empty entity name")]
    EmptyEntityName(String),
    /// Category label is not in the table
    #[error("invalid entity path: unknown category {0:?}")]
    UnknownCategory(String),
}
