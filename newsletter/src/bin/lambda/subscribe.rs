use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use newsletter::startup::Application;
use newsletter::subscribe_handler::handle_request;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let application = Application::build("newsletter-subscribe").await?;
    let application = &application;

    run(service_fn(
        |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
            let response = handle_request(
                event.payload,
                &application.secret_resolver,
                &application.brevo_client,
            )
            .await;

            application.flush_telemetry();

            Ok::<_, Error>(response)
        },
    ))
    .await
}
