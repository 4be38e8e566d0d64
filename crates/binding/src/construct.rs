use tether_inventory::{Argument, ComponentType, ConstructError, Construction, Instance};

/// Creates an instance of `ty`, trying strategies in a fixed order.
///
/// 1. Singleton: the shared instance; `argument` is ignored.
/// 2. Factory: the argument-taking factory when both it and `argument` exist,
///    otherwise the plain factory.
/// 3. Argument-taking initializer, given `argument` or `Argument::Null`.
/// 4. No-argument initializer.
/// 5. The type's static instance.
pub fn instantiate(ty: &ComponentType, argument: Option<&Argument>) -> Result<Instance, ConstructError> {
	match ty.construction() {
		Construction::Singleton(singleton) => singleton.instance(),
		Construction::Factory {
			create,
			create_with_argument,
		} => match (argument, create_with_argument) {
			(Some(argument), Some(create_with_argument)) => create_with_argument(argument),
			_ => create(),
		},
		Construction::Constructible {
			with_argument: Some(init), ..
		} => init(argument.unwrap_or(&Argument::Null)),
		Construction::Constructible { default: Some(init), .. } => init(),
		Construction::Constructible { .. } | Construction::Plain => ty.statics().cloned().ok_or_else(|| ConstructError::NoStrategy {
			name: ty.name().to_string(),
		}),
	}
}
