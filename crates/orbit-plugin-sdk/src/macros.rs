//! Export macro for plugin crates.

/// Export the `loader` declaration for a plugin type.
///
/// The one-argument form builds the plugin with `Default::default()`; the two-argument
/// form calls the given constructor.
///
/// # Example
///
/// ```rust,ignore
/// use orbit_plugin_sdk::prelude::*;
///
/// struct Recorder { path: String }
///
/// impl Recorder {
///     fn new() -> Self {
///         Self { path: "/tmp/rec".into() }
///     }
/// }
///
/// export_plugin!(Recorder, Recorder::new);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($ty:ty) => {
        $crate::export_plugin!($ty, <$ty as ::std::default::Default>::default);
    };
    ($ty:ty, $constructor:expr) => {
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static loader: $crate::PluginDeclaration = $crate::PluginDeclaration::new({
            fn register(registrar: &mut dyn $crate::PluginRegistrar) {
                let plugin: $ty = ($constructor)();
                registrar.register_plugin(::std::boxed::Box::new(plugin));
            }
            register
        });
    };
}
