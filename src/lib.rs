pub mod app;

use app::commands::{
    add_family_member, assign_device, change_password, delete_family_member, end_assignment,
    export_diagnostics_bundle, get_base_stations, get_config, get_device_board,
    list_active_customers, list_family_members, list_resolved_sos, load_more_activities, login,
    logout, open_activity_log, register_account, reset_config, resolve_sos_by_qr, role_info,
    save_app_config, session_info, toggle_activity_filter, update_family_member, update_profile,
    verify_device,
};
use app::logging::init_logging;
use app::state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_logging();
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_notification::init())
        .plugin(tauri_plugin_opener::init())
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            get_config,
            save_app_config,
            reset_config,
            login,
            logout,
            session_info,
            role_info,
            open_activity_log,
            load_more_activities,
            toggle_activity_filter,
            list_active_customers,
            get_device_board,
            assign_device,
            end_assignment,
            list_resolved_sos,
            resolve_sos_by_qr,
            verify_device,
            register_account,
            change_password,
            update_profile,
            list_family_members,
            add_family_member,
            update_family_member,
            delete_family_member,
            get_base_stations,
            export_diagnostics_bundle
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
