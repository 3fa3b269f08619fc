//! Android host integration with JNI functions

use crate::{
    init::InitCell,
    BinaryChannel, EmbedError, EmbeddedViewFactory, HostActivity,
    HostContext, HostMessenger, LayoutBinding, PlatformView, PlatformViewFactory,
};
use jni::{
    JNIEnv, JavaVM,
    objects::{GlobalRef, JByteArray, JClass, JObject, JString, JValue},
    sys::{jboolean, jbyteArray, jint, jlong},
};
use log::{debug, error};
use std::{
    ffi::c_void,
    sync::{Arc, Mutex},
};

/// Stores the last error that occurred while serving the host
static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

fn store_error(message: String) {
    error!("{}", message);
    if let Ok(mut last_error) = LAST_ERROR.lock() {
        *last_error = Some(message);
    }
}

fn take_last_error() -> Option<String> {
    LAST_ERROR.lock().ok().and_then(|mut e| e.take())
}

fn jni_err(call: &str, e: jni::errors::Error) -> EmbedError {
    EmbedError::Platform(format!("{call}: {e}"))
}

/// Looks up `Resources.getIdentifier(name, kind, package)`; 0 means missing
fn resource_identifier(
    env: &mut JNIEnv,
    context: &JObject,
    package: &str,
    name: &str,
    kind: &str,
) -> jni::errors::Result<jint> {
    let resources = env
        .call_method(
            context,
            "getResources",
            "()Landroid/content/res/Resources;",
            &[],
        )?
        .l()?;
    let j_name = env.new_string(name)?;
    let j_kind = env.new_string(kind)?;
    let j_package = env.new_string(package)?;
    env.call_method(
        &resources,
        "getIdentifier",
        "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)I",
        &[
            JValue::Object(&j_name),
            JValue::Object(&j_kind),
            JValue::Object(&j_package),
        ],
    )?
    .i()
}

fn package_name(env: &mut JNIEnv, context: &JObject) -> jni::errors::Result<String> {
    let package = env
        .call_method(context, "getPackageName", "()Ljava/lang/String;", &[])?
        .l()?;
    Ok(env.get_string(&JString::from(package))?.into())
}

/// `android.content.Context` supplied with a creation request
pub struct AndroidContext {
    vm: JavaVM,
    context: GlobalRef,
    package: String,
}

impl AndroidContext {
    /// Pins `context` with a global reference
    pub fn new(env: &mut JNIEnv, context: &JObject) -> crate::Result<Self> {
        let package = package_name(env, context).map_err(|e| jni_err("getPackageName", e))?;
        Ok(Self {
            vm: env.get_java_vm().map_err(|e| jni_err("GetJavaVM", e))?,
            context: env
                .new_global_ref(context)
                .map_err(|e| jni_err("NewGlobalRef", e))?,
            package,
        })
    }

    fn lookup_string(&self, name: &str) -> jni::errors::Result<Option<String>> {
        let mut env = self.vm.attach_current_thread()?;
        let context = self.context.as_obj();
        let id = resource_identifier(&mut env, context, &self.package, name, "string")?;
        if id == 0 {
            return Ok(None);
        }
        let value = env
            .call_method(context, "getString", "(I)Ljava/lang/String;", &[JValue::Int(id)])?
            .l()?;
        Ok(Some(env.get_string(&JString::from(value))?.into()))
    }
}

impl HostContext for AndroidContext {
    fn package_name(&self) -> &str {
        &self.package
    }

    fn string_resource(&self, name: &str) -> Option<String> {
        match self.lookup_string(name) {
            Ok(value) => value,
            Err(e) => {
                error!("String resource {} lookup failed: {}", name, e);
                None
            }
        }
    }
}

/// The `android.app.Activity` hosting embedded views
pub struct AndroidActivity {
    vm: JavaVM,
    activity: GlobalRef,
    package: String,
}

impl AndroidActivity {
    /// Pins `activity` with a global reference
    pub fn new(env: &mut JNIEnv, activity: &JObject) -> crate::Result<Self> {
        let package = package_name(env, activity).map_err(|e| jni_err("getPackageName", e))?;
        Ok(Self {
            vm: env.get_java_vm().map_err(|e| jni_err("GetJavaVM", e))?,
            activity: env
                .new_global_ref(activity)
                .map_err(|e| jni_err("NewGlobalRef", e))?,
            package,
        })
    }

    fn identifier(&self, name: &str, kind: &str) -> crate::Result<jint> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| jni_err("AttachCurrentThread", e))?;
        resource_identifier(&mut env, self.activity.as_obj(), &self.package, name, kind)
            .map_err(|e| jni_err("getIdentifier", e))
    }
}

impl HostActivity for AndroidActivity {
    fn set_theme(&self, style: &str) -> crate::Result<()> {
        let failed = |reason: String| EmbedError::ThemeApplicationFailed {
            style: style.to_owned(),
            reason,
        };
        let id = self.identifier(style, "style").map_err(|e| failed(e.to_string()))?;
        if id == 0 {
            return Err(failed("style resource not found".into()));
        }

        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| failed(e.to_string()))?;
        env.call_method(self.activity.as_obj(), "setTheme", "(I)V", &[JValue::Int(id)])
            .map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    fn inflate(&self, layout: &str) -> crate::Result<LayoutBinding> {
        match self.identifier(layout, "layout")? {
            0 => Err(EmbedError::LayoutInflation(layout.to_owned())),
            id => Ok(LayoutBinding::new(layout, id)),
        }
    }
}

struct AndroidBridge {
    messenger: Arc<HostMessenger>,
    factory: EmbeddedViewFactory,
}

/// Global bridge state, set once by a successful `nativeInit`
static BRIDGE: InitCell<AndroidBridge> = InitCell::new();

impl AndroidBridge {
    fn init(env: &mut JNIEnv, activity: &JObject) -> crate::Result<Self> {
        let host_activity = Arc::new(AndroidActivity::new(env, activity)?);

        // ndk-context asserts on a second initialization, so this runs only
        // inside the one successful bridge initializer. The global ref held
        // by `host_activity` outlives every later ndk-context user.
        unsafe {
            ndk_context::initialize_android_context(
                host_activity.vm.get_java_vm_pointer() as *mut c_void,
                host_activity.activity.as_obj().as_raw() as *mut c_void,
            );
        }

        let messenger = Arc::new(HostMessenger::new());
        let factory = EmbeddedViewFactory::new(messenger.clone(), host_activity);
        Ok(Self { messenger, factory })
    }
}

// ============================================================================
// JNI Entry Points
// ============================================================================

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_eopeter_flutter_1mapbox_1navigation_NavigationNative_nativeInit(
    mut env: JNIEnv,
    _class: JClass,
    activity: JObject,
) -> jboolean {
    match BRIDGE.get_or_try_init(|| AndroidBridge::init(&mut env, &activity)) {
        Ok(_) => {
            debug!("Navigation bridge ready");
            1
        }
        Err(e) => {
            store_error(format!("Navigation bridge not initialized: {e}"));
            0
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_eopeter_flutter_1mapbox_1navigation_NavigationNative_nativeCreateView(
    mut env: JNIEnv,
    _class: JClass,
    context: JObject,
    view_id: jint,
    args: JByteArray,
) -> jlong {
    debug!("nativeCreateView called: viewId {}", view_id);

    let Some(bridge) = BRIDGE.get() else {
        store_error("nativeCreateView called before nativeInit".to_string());
        return 0;
    };

    let host_context: Option<Arc<dyn HostContext>> = if context.is_null() {
        None
    } else {
        match AndroidContext::new(&mut env, &context) {
            Ok(host_context) => Some(Arc::new(host_context)),
            Err(e) => {
                store_error(e.to_string());
                return 0;
            }
        }
    };

    let raw_args = if args.is_null() {
        Vec::new()
    } else {
        match env.convert_byte_array(args) {
            Ok(bytes) => bytes,
            Err(e) => {
                store_error(format!("Failed to convert creation args: {e}"));
                return 0;
            }
        }
    };

    match bridge.factory.create_view(host_context, view_id, &raw_args) {
        Ok(view) => Box::into_raw(Box::new(view)) as jlong,
        Err(e) => {
            store_error(format!("Navigation view {view_id} not created: {e}"));
            0
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_eopeter_flutter_1mapbox_1navigation_NavigationNative_nativeDisposeView(
    _env: JNIEnv,
    _class: JClass,
    view_ptr: jlong,
) {
    if view_ptr == 0 {
        return;
    }

    let mut view = unsafe { Box::from_raw(view_ptr as *mut Box<dyn PlatformView>) };
    view.dispose();
    debug!("Navigation view {} destroyed", view.instance_id());
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_eopeter_flutter_1mapbox_1navigation_NavigationNative_nativeSendMessage(
    env: JNIEnv,
    _class: JClass,
    view_ptr: jlong,
    data: JByteArray,
) {
    let Some(view) = (unsafe { (view_ptr as *const Box<dyn PlatformView>).as_ref() }) else {
        return;
    };
    let Some(bridge) = BRIDGE.get() else {
        return;
    };

    // Convert Java byte array to Rust Vec<u8>
    let bytes = match env.convert_byte_array(data) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to convert byte array: {:?}", e);
            return;
        }
    };

    let host = view
        .channel()
        .and_then(|channel| bridge.messenger.host_endpoint(channel.name()));
    match host {
        Some(host) => {
            if let Err(e) = host.send(bytes) {
                error!("Failed to deliver message to view {}: {}", view.instance_id(), e);
            }
        }
        None => error!("View {} has no open channel", view.instance_id()),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_eopeter_flutter_1mapbox_1navigation_NavigationNative_nativeReceiveMessage(
    env: JNIEnv,
    _class: JClass,
    view_ptr: jlong,
) -> jbyteArray {
    let null = JObject::null().into_raw() as jbyteArray;
    let Some(view) = (unsafe { (view_ptr as *const Box<dyn PlatformView>).as_ref() }) else {
        return null;
    };
    let Some(bridge) = BRIDGE.get() else {
        return null;
    };

    let message = view
        .channel()
        .and_then(|channel| bridge.messenger.host_endpoint(channel.name()))
        .and_then(|host| host.receive());

    if let Some(message) = message {
        // Convert Rust Vec<u8> to Java byte array
        match env.byte_array_from_slice(&message) {
            Ok(array) => return array.into_raw(),
            Err(e) => error!("Failed to create byte array: {:?}", e),
        }
    }
    null
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_eopeter_flutter_1mapbox_1navigation_NavigationNative_nativeGetLastError<
    'local,
>(
    env: JNIEnv<'local>,
    _class: JClass,
) -> JObject<'local> {
    let Some(message) = take_last_error() else {
        return JObject::null();
    };
    match env.new_string(message) {
        Ok(jstring) => jstring.into(),
        Err(_) => JObject::null(),
    }
}
